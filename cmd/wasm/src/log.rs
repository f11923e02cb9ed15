use log::error;
use std::panic;

fn log_panic(info: &panic::PanicHookInfo) {
    let mut msg = info.to_string();
    msg.push_str("\n\n");

    error!("{}", msg);
}

pub fn setup_logger() {
    panic::set_hook(Box::new(log_panic));

    // A second call (worker re-init) finds the logger already installed.
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("console logger already installed");
    }
}
