pub mod mapper268_0;
pub mod mapper268_1;

pub mod mapper268;
pub mod mmc3;
