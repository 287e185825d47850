mod algorithm;
mod data_source;
mod errors;
mod hyperparams;
mod init;
mod manual;
mod session;
mod state;

pub use algorithm::*;
pub use data_source::*;
pub use errors::*;
pub use hyperparams::*;
pub use init::*;
pub use manual::*;
pub use session::*;
pub use state::*;
