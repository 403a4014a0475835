// Copyright (c) 2024-2026 Martin Schröder <info@swedishembedded.com>
//
// SPDX-License-Identifier: MIT
//! Raw-RPC bridge (spec.md §4.8), grounded on
//! `original_source/src/tools/mtproto.py`.
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::platform::PlatformClient;

#[derive(Debug, Clone, Serialize)]
pub struct RpcResult {
    pub ok: bool,
    pub result: Value,
}

/// `invoke(method_full_name, params)`: validates that `method_full_name`
/// names a `module.ClassName` pair — the split the platform's method
/// registry needs to resolve the call object and, where the registry applies
/// a naming convention (e.g. a `Request` suffix), the platform client is
/// responsible for that; this layer only validates shape and forwards.
pub async fn invoke(
    client: &dyn PlatformClient,
    method_full_name: &str,
    params: Map<String, Value>,
) -> Result<RpcResult, CoreError> {
    if method_full_name.split_once('.').is_none() {
        return Err(CoreError::Validation(format!(
            "method_full_name must be of the form 'module.ClassName', got {method_full_name:?}"
        )));
    }

    let result = client.invoke_raw(method_full_name, params).await?;
    Ok(RpcResult { ok: true, result })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::MockPlatformClient;

    #[tokio::test]
    async fn invoke_forwards_method_and_params_to_the_platform_client() {
        let client = MockPlatformClient::new();
        let mut params = Map::new();
        params.insert("peer".into(), Value::String("@foo".into()));
        let result = invoke(&client, "messages.GetHistoryRequest", params).await.unwrap();
        assert!(result.ok);
        assert_eq!(result.result["method"], "messages.GetHistoryRequest");
        assert_eq!(result.result["echo"]["peer"], "@foo");
    }

    #[tokio::test]
    async fn invoke_rejects_method_name_without_a_dot() {
        let client = MockPlatformClient::new();
        let err = invoke(&client, "GetHistoryRequest", Map::new()).await.unwrap_err();
        assert_eq!(err.kind(), "validation");
    }
}
