use crate::domain::payment::Environment;
use crate::domain::ports::ConfigSource;
use crate::error::{PaymentError, Result};
use serde::Serialize;

/// Gateway addresses for one environment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Endpoints {
    /// Where the payer's browser posts the payment form.
    pub pay_url: String,
    pub return_url: String,
    pub cancel_url: String,
}

impl Endpoints {
    fn from_source(source: &dyn ConfigSource, prefix: &str) -> Result<Self> {
        let read = |name: &str| {
            let key = format!("{prefix}{name}");
            source.get(&key).ok_or(PaymentError::MissingConfig(key))
        };
        Ok(Self {
            pay_url: read("pay_url")?,
            return_url: read("return_url")?,
            cancel_url: read("cancel_url")?,
        })
    }
}

/// The real and demo URL sets, read once at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GatewayConfig {
    pub real: Endpoints,
    pub demo: Endpoints,
}

impl GatewayConfig {
    /// Reads `payment_{pay,return,cancel}_url` and their `payment_demo_` variants.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self> {
        Ok(Self {
            real: Endpoints::from_source(source, "payment_")?,
            demo: Endpoints::from_source(source, "payment_demo_")?,
        })
    }

    pub fn endpoints(&self, environment: Environment) -> &Endpoints {
        match environment {
            Environment::Real => &self.real,
            Environment::Demo => &self.demo,
        }
    }
}
