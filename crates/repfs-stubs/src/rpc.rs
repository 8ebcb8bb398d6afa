use serde::de::DeserializeOwned;
use serde::Serialize;

use repfs_net::tcp::TcpSocket;
use repfs_net::RpcClient;
use repfs_proto::wire;
use repfs_types::{Result, Status, StatusCode};

/// Encode a request, perform one RPC exchange, decode the response.
///
/// Transport and codec failures all surface as GENERIC statuses naming the
/// endpoint, so callers can log-and-continue per the fan-out policy.
pub(crate) async fn call_unary<Req, Rsp>(
    client: &RpcClient<TcpSocket>,
    endpoint: &str,
    service_id: u16,
    method_id: u16,
    req: &Req,
) -> Result<Rsp>
where
    Req: Serialize + Sync,
    Rsp: DeserializeOwned,
{
    let body = wire::encode(req)
        .map_err(|e| Status::with_message(StatusCode::GENERIC, e.to_string()))?;

    let rsp = client
        .call(endpoint, service_id, method_id, &body)
        .await
        .map_err(|e| {
            Status::with_message(StatusCode::GENERIC, format!("rpc to {endpoint} failed: {e}"))
        })?;

    wire::decode(&rsp).map_err(|e| {
        Status::with_message(
            StatusCode::GENERIC,
            format!("bad response from {endpoint}: {e}"),
        )
    })
}
