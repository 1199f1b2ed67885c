// supctl-client - XML-RPC client for supervisord

pub mod client;
pub mod xmlrpc;

pub use client::XmlRpcSupervisor;
pub use xmlrpc::{MethodResponse, Value, XmlRpcError};
