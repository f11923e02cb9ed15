use std::fs;
use std::path::PathBuf;

use anyhow::{ensure, Context};
use argh::FromArgs;
use classifier::config::{TrainConfig, IRIS_MODEL_CONFIG, REFERENCE_FLOWERS};
use classifier::IrisClassifier;
use dataset::{csv_to_dataset, train_test_split};
use futures::executor::block_on;
use loader::{AssetPaths, Bootstrap, FileSource};
use log::info;
use nn::network::NeuralNetwork;
use state_dict::{to_safetensors, FromStateDict};

#[derive(FromArgs, Debug, PartialEq)]
#[argh(description = "Train and query the iris flower classifier.")]
struct Args {
    #[argh(subcommand)]
    command: Command,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand)]
enum Command {
    Train(TrainArgs),
    Predict(PredictArgs),
    Demo(DemoArgs),
    Check(CheckArgs),
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "train", description = "train a model on an iris csv file")]
struct TrainArgs {
    #[argh(option, short = 'd', description = "path to the iris csv")]
    dataset: PathBuf,
    #[argh(option, short = 'e', default = "2000", description = "number of epochs")]
    epochs: usize,
    #[argh(option, short = 'l', default = "0.1", description = "learning rate")]
    learning_rate: f32,
    #[argh(option, default = "42", description = "seed for initialisation and shuffling")]
    seed: u64,
    #[argh(option, default = "0.0", description = "share of rows held out for testing")]
    test_ratio: f32,
    #[argh(option, short = 'o', description = "where to write the safetensors weights")]
    output: Option<PathBuf>,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(subcommand, name = "predict", description = "classify one flower")]
struct PredictArgs {
    #[argh(option, short = 'm', description = "safetensors weights from `train`")]
    model: PathBuf,
    #[argh(
        positional,
        description = "sepal length, sepal width, petal length, petal width"
    )]
    features: Vec<f32>,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(
    subcommand,
    name = "demo",
    description = "train on <root>/dataset/iris.csv and evaluate the reference flowers"
)]
struct DemoArgs {
    #[argh(option, default = "PathBuf::from(\"web\")", description = "web root")]
    root: PathBuf,
}

#[derive(FromArgs, Debug, PartialEq)]
#[argh(
    subcommand,
    name = "check",
    description = "verify a web root holds the wasm bundle and the dataset"
)]
struct CheckArgs {
    #[argh(option, default = "PathBuf::from(\"web\")", description = "web root")]
    root: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let args: Args = argh::from_env();

    pretty_env_logger::init();

    match args.command {
        Command::Train(args) => train(args),
        Command::Predict(args) => predict(args),
        Command::Demo(args) => demo(args),
        Command::Check(args) => check(args),
    }
}

fn train(args: TrainArgs) -> anyhow::Result<()> {
    ensure!(
        (0f32..1f32).contains(&args.test_ratio),
        "--test-ratio must be in [0, 1)"
    );

    let data = fs::read_to_string(&args.dataset)
        .with_context(|| format!("failed to read {}", args.dataset.display()))?;
    let (train_set, test_set) = train_test_split(csv_to_dataset(&data)?, args.test_ratio, args.seed);

    let config = TrainConfig {
        epochs: args.epochs,
        learning_rate: args.learning_rate,
        seed: args.seed,
        ..TrainConfig::default()
    };

    let mut classifier = IrisClassifier::new(&IRIS_MODEL_CONFIG, train_set.clone(), config.seed)?;
    let report = classifier.train(&config, |epoch, error| {
        info!("epoch {}: error({})", epoch + 1, error);
    })?;

    println!(
        "trained {} epochs in {:.2}s, final error {:.5}",
        report.epochs, report.seconds, report.final_error
    );
    println!("train accuracy: {:.3}", classifier.accuracy(&train_set)?);
    if !test_set.is_empty() {
        println!("test accuracy: {:.3}", classifier.accuracy(&test_set)?);
    }

    if let Some(output) = args.output {
        fs::write(&output, to_safetensors(classifier.network())?)
            .with_context(|| format!("failed to write {}", output.display()))?;
        println!("weights written to {}", output.display());
    }

    Ok(())
}

fn predict(args: PredictArgs) -> anyhow::Result<()> {
    let weights = fs::read(&args.model)
        .with_context(|| format!("failed to read {}", args.model.display()))?;
    let classifier = IrisClassifier::from_network(NeuralNetwork::from_safetensors(&weights)?)?;

    let prediction = classifier.predict(&args.features)?;
    println!(
        "{} (confidence {:.3}, outputs {:?})",
        prediction.class, prediction.confidence, prediction.outputs
    );

    Ok(())
}

fn demo(args: DemoArgs) -> anyhow::Result<()> {
    let bootstrap = Bootstrap::new(FileSource::new(args.root), AssetPaths::default());
    let dataset = block_on(bootstrap.load_dataset())?;

    let config = TrainConfig::default();
    let mut classifier = IrisClassifier::new(&IRIS_MODEL_CONFIG, dataset, config.seed)?;
    classifier.error(|error| info!("error({})", error));
    classifier.train(&config, |_, _| {})?;

    for flower in REFERENCE_FLOWERS.iter() {
        let prediction = classifier.predict(flower)?;
        println!("Evaluate {:?} = {:?} -> {}", flower, prediction.outputs, prediction.class);
    }

    Ok(())
}

fn check(args: CheckArgs) -> anyhow::Result<()> {
    // Worker assets resolve against the worker script in <root>/src.
    let worker = Bootstrap::new(FileSource::new(args.root.join("src")), AssetPaths::default());
    let payload = block_on(worker.fetch_binary())?;
    let script = block_on(worker.load_glue_script(&payload))?;
    println!(
        "wasm binary: {} bytes, glue script {}: {} bytes",
        payload.binary.len(),
        payload.glue_script,
        script.len()
    );

    let page = Bootstrap::new(FileSource::new(&args.root), AssetPaths::default());
    let dataset = block_on(page.load_dataset())?;
    println!("dataset: {} samples", dataset.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, argh::EarlyExit> {
        Args::from_args(&["iris-cli"], args)
    }

    #[test]
    fn test_train_defaults() {
        let args = parse(&["train", "--dataset", "iris.csv"]).unwrap();

        assert_eq!(
            args.command,
            Command::Train(TrainArgs {
                dataset: PathBuf::from("iris.csv"),
                epochs: 2000,
                learning_rate: 0.1,
                seed: 42,
                test_ratio: 0.0,
                output: None,
            })
        );
    }

    #[test]
    fn test_predict_features() {
        let args = parse(&["predict", "-m", "iris.safetensors", "5.0", "3.4", "1.5", "0.2"]).unwrap();

        match args.command {
            Command::Predict(args) => assert_eq!(args.features, vec![5.0, 3.4, 1.5, 0.2]),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_demo_root_default() {
        let args = parse(&["demo"]).unwrap();

        assert_eq!(
            args.command,
            Command::Demo(DemoArgs {
                root: PathBuf::from("web")
            })
        );
    }

    #[test]
    fn test_check_reports_missing_bundle() {
        let root = std::env::temp_dir().join(format!("iris-cli-check-{}", std::process::id()));
        fs::create_dir_all(root.join("src/wasm")).unwrap();
        fs::create_dir_all(root.join("dataset")).unwrap();
        fs::write(
            root.join("dataset/iris.csv"),
            "sepal_length,sepal_width,petal_length,petal_width,class\n5.1,3.5,1.4,0.2,setosa\n",
        )
        .unwrap();

        let err = check(CheckArgs { root: root.clone() }).unwrap_err();
        assert_eq!(err.to_string(), "failed to load wasm binary");

        fs::write(root.join("src/wasm/iris_wasm_bg.wasm"), b"\0asm\x01\0\0\0").unwrap();
        fs::write(root.join("src/wasm/iris_wasm.js"), "let wasm_bindgen;").unwrap();
        check(CheckArgs { root: root.clone() }).unwrap();

        fs::remove_dir_all(root).unwrap();
    }

    #[test]
    fn test_train_requires_dataset() {
        assert!(parse(&["train"]).is_err());
    }
}
