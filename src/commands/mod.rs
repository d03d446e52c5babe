pub mod evidence;
pub mod index;
pub mod init;
pub mod normalize;
pub mod novelty;
pub mod query;
pub mod resolve;
