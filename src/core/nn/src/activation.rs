use anyhow::anyhow;
use std::fmt::Debug;

/// Element-wise non-linearity. `derivative` takes the pre-activation value,
/// the same input `calc` receives.
pub trait Activation: Debug {
    fn name(&self) -> &'static str;
    fn calc(&self, x: f32) -> f32;
    fn derivative(&self, x: f32) -> f32;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Sigmoid;

#[derive(Debug, Default, Clone, Copy)]
pub struct HyperbolicTangent;

#[derive(Debug, Default, Clone, Copy)]
pub struct SoftPlus;

#[derive(Debug, Default, Clone, Copy)]
pub struct Identity;

impl Activation for Sigmoid {
    fn name(&self) -> &'static str {
        "sigmoid"
    }

    fn calc(&self, x: f32) -> f32 {
        1f32 / (1f32 + (-x).exp())
    }

    fn derivative(&self, x: f32) -> f32 {
        let s = self.calc(x);
        s * (1f32 - s)
    }
}

impl Activation for HyperbolicTangent {
    fn name(&self) -> &'static str {
        "tanh"
    }

    fn calc(&self, x: f32) -> f32 {
        x.tanh()
    }

    fn derivative(&self, x: f32) -> f32 {
        1f32 - x.tanh().powi(2)
    }
}

impl Activation for SoftPlus {
    fn name(&self) -> &'static str {
        "softplus"
    }

    fn calc(&self, x: f32) -> f32 {
        // exp overflows well before this point matters
        if x > 20f32 {
            x
        } else {
            x.exp().ln_1p()
        }
    }

    fn derivative(&self, x: f32) -> f32 {
        Sigmoid.calc(x)
    }
}

impl Activation for Identity {
    fn name(&self) -> &'static str {
        "identity"
    }

    fn calc(&self, x: f32) -> f32 {
        x
    }

    fn derivative(&self, _x: f32) -> f32 {
        1f32
    }
}

pub fn activation_by_name(name: &str) -> anyhow::Result<Box<dyn Activation>> {
    match name {
        "sigmoid" => Ok(Box::new(Sigmoid)),
        "tanh" => Ok(Box::new(HyperbolicTangent)),
        "softplus" => Ok(Box::new(SoftPlus)),
        "identity" => Ok(Box::new(Identity)),
        _ => Err(anyhow!("unknown activation: {}", name)),
    }
}
