pub mod ml;

pub use ml::MlServiceClient;
