//! A stub Ethereum node endpoint for passthrough tests.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use jsonrpsee::{
    server::{ServerBuilder, ServerHandle},
    RpcModule,
};

/// A running stub node.
///
/// The server stops when `handle` is dropped.
#[derive(Debug)]
pub struct NodeStub {
    /// HTTP URL of the stub, usable as a provider `endpoint`.
    pub url: String,

    /// Number of `eth_blockNumber` calls served so far.
    pub calls: Arc<AtomicU64>,

    /// Keeps the server alive.
    pub handle: ServerHandle,
}

/// Spawns a JSON-RPC server on an ephemeral port that answers
/// `eth_blockNumber` with `"0x10"` and counts how often it was asked.
///
/// Unregistered methods get the server's standard "method not found" error
/// envelope, which is handy for asserting that error responses are forwarded
/// unchanged.
pub async fn spawn_node_stub() -> anyhow::Result<NodeStub> {
    let server = ServerBuilder::default().build("127.0.0.1:0").await?;
    let addr = server.local_addr()?;

    let calls = Arc::new(AtomicU64::new(0));
    let mut module = RpcModule::new(calls.clone());
    module.register_method("eth_blockNumber", |_params, calls, _ext| {
        calls.fetch_add(1, Ordering::SeqCst);
        "0x10".to_owned()
    })?;
    module.register_method("eth_chainId", |_params, _calls, _ext| "0x1".to_owned())?;

    let handle = server.start(module);

    Ok(NodeStub {
        url: format!("http://{addr}"),
        calls,
        handle,
    })
}
