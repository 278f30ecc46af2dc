mod adversarial;
mod cli;
mod properties;
