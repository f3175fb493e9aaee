// Authors: Robert Lopez

pub mod credentials;
pub mod flow;
pub mod issuer;
pub mod outcome;
pub mod policy;
pub mod server;
pub mod signer;
pub mod submit;
