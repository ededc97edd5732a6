//! JSON-RPC 2.0 envelopes spoken by the mobile endpoint.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{client::DateRange, clock::Clock, totp::Totp, UntisError};

pub const JSONRPC_VERSION: &str = "2.0";
pub const REQUEST_ID: &str = "UntisTimetableRust";

pub const METHOD_USER_DATA: &str = "getUserData2017";
pub const METHOD_TIMETABLE: &str = "getTimetable2017";

const ELEMENT_TYPE_STUDENT: &str = "STUDENT";
const MASTER_DATA_TIMESTAMP: i64 = 1_724_834_423_826;
const DEVICE_OS: &str = "IOS";
const DEVICE_OS_VERSION: &str = "18.0";

/// Credentials attached to every call. The one-time code is only valid for
/// the window it was generated in, so build a fresh one per request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Auth {
    pub user: String,
    pub otp: String,
    pub client_time: i64,
}

impl Auth {
    pub fn new(user: &str, totp: &Totp, clock: &impl Clock) -> Result<Self, UntisError> {
        Ok(Self {
            user: user.to_string(),
            otp: totp.generate_now(clock)?.to_string(),
            client_time: clock.unix_millis(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RpcRequest<P> {
    pub jsonrpc: &'static str,
    pub id: &'static str,
    pub method: &'static str,
    pub params: [P; 1],
}

impl<P: Serialize> RpcRequest<P> {
    fn new(method: &'static str, params: P) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION,
            id: REQUEST_ID,
            method,
            params: [params],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDataParams {
    pub master_data_timestamp: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub start_date: String,
    pub end_date: String,
    pub auth: Auth,
    pub device_os: &'static str,
    pub device_os_version: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableParams {
    pub auth: Auth,
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub start_date: String,
    pub end_date: String,
}

pub fn user_data_request(auth: Auth, range: &DateRange) -> RpcRequest<UserDataParams> {
    RpcRequest::new(
        METHOD_USER_DATA,
        UserDataParams {
            master_data_timestamp: MASTER_DATA_TIMESTAMP,
            kind: ELEMENT_TYPE_STUDENT,
            start_date: range.start_param(),
            end_date: range.end_param(),
            auth,
            device_os: DEVICE_OS,
            device_os_version: DEVICE_OS_VERSION,
        },
    )
}

pub fn timetable_request(
    auth: Auth,
    student_id: i64,
    range: &DateRange,
) -> RpcRequest<TimetableParams> {
    RpcRequest::new(
        METHOD_TIMETABLE,
        TimetableParams {
            auth,
            id: student_id,
            kind: ELEMENT_TYPE_STUDENT,
            start_date: range.start_param(),
            end_date: range.end_param(),
        },
    )
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcErrorBody {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcErrorBody>,
}

impl<T> RpcResponse<T> {
    pub fn into_result(self) -> Result<T, UntisError> {
        if let Some(error) = self.error {
            return Err(UntisError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        self.result
            .ok_or_else(|| UntisError::MalformedInput("response carries no result".to_string()))
    }
}

/// Parses a response body and unwraps its `result`.
pub fn parse_response<T: DeserializeOwned>(body: &str) -> Result<T, UntisError> {
    serde_json::from_str::<RpcResponse<T>>(body)
        .map_err(|e| UntisError::MalformedInput(format!("response envelope: {e}")))?
        .into_result()
}

/// The element id of the logged in student, found in the user data result.
pub fn student_element_id(user_data: &Value) -> Result<i64, UntisError> {
    user_data
        .pointer("/userData/elemId")
        .and_then(Value::as_i64)
        .ok_or_else(|| UntisError::MalformedInput("user data carries no elemId".to_string()))
}
