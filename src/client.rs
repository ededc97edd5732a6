use std::time::Duration;

use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    clock::{Clock, SystemClock},
    config::UntisConfig,
    rpc::{self, Auth, RpcRequest},
    timetable::{self, Homework, RawTimetableResult, Timetable},
    totp::Totp,
    UntisError,
};

const ENDPOINT_PATH: &str = "/WebUntis/jsonrpc_intern.do";
const PARAM_DATE_FORMAT: &str = "%Y%m%d";

/// Parses a date given as `YYYYMMDD` or `YYYY-MM-DD`.
pub fn parse_date(value: &str) -> Result<NaiveDate, UntisError> {
    let compact = value.trim().replace('-', "");

    NaiveDate::parse_from_str(&compact, PARAM_DATE_FORMAT)
        .ok()
        .filter(|_| compact.len() == 8)
        .ok_or_else(|| UntisError::InvalidDate(value.to_string()))
}

/// Inclusive range of days a query covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Builds a range from optional bounds; missing ones default to today.
    pub fn resolve(start: Option<NaiveDate>, end: Option<NaiveDate>, clock: &impl Clock) -> Self {
        let today = clock.today();

        Self {
            start: start.unwrap_or(today),
            end: end.unwrap_or(today),
        }
    }

    pub fn today(clock: &impl Clock) -> Self {
        Self::resolve(None, None, clock)
    }

    pub(crate) fn start_param(&self) -> String {
        self.start.format(PARAM_DATE_FORMAT).to_string()
    }

    pub(crate) fn end_param(&self) -> String {
        self.end.format(PARAM_DATE_FORMAT).to_string()
    }
}

/// Blocking client for the mobile JSON-RPC endpoint of one school.
#[derive(Debug)]
pub struct UntisClient<C = SystemClock> {
    config: UntisConfig,
    totp: Totp,
    http: reqwest::blocking::Client,
    clock: C,
}

impl UntisClient<SystemClock> {
    pub fn new(config: UntisConfig) -> Result<Self, UntisError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<C: Clock> UntisClient<C> {
    /// Creates a client reading time from `clock`.
    pub fn with_clock(config: UntisConfig, clock: C) -> Result<Self, UntisError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(UntisError::Http)?;
        let totp = Totp::new(config.secret.clone());

        Ok(Self {
            config,
            totp,
            http,
            clock,
        })
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// The endpoint URL for `method` on the configured server and school.
    pub fn endpoint(&self, method: &str) -> Result<url::Url, UntisError> {
        let mut url = url::Url::parse(&format!("https://{}{ENDPOINT_PATH}", self.config.server))
            .map_err(UntisError::UriParseError)?;

        url.query_pairs_mut()
            .append_pair("a", "0")
            .append_pair("m", method)
            .append_pair("s", &self.config.server)
            .append_pair("school", &self.config.school)
            .append_pair("v", &self.config.client_version);

        Ok(url)
    }

    fn auth(&self) -> Result<Auth, UntisError> {
        Auth::new(&self.config.username, &self.totp, &self.clock)
    }

    fn call<P: Serialize, T: DeserializeOwned>(
        &self,
        request: &RpcRequest<P>,
    ) -> Result<T, UntisError> {
        let url = self.endpoint(request.method)?;
        info!(method = request.method, school = %self.config.school, "Calling timetable server");

        let response = self
            .http
            .post(url)
            .json(request)
            .send()
            .map_err(UntisError::Http)?
            .error_for_status()
            .map_err(UntisError::Http)?;

        let body = response.text().map_err(UntisError::Http)?;
        debug!(method = request.method, bytes = body.len(), "Received response");

        rpc::parse_response(&body)
    }

    /// Fetches the user data of the logged in account, including the
    /// student's element id.
    pub fn fetch_master_data(&self, range: &DateRange) -> Result<Value, UntisError> {
        self.call(&rpc::user_data_request(self.auth()?, range))
    }

    /// Fetches the timetable of the logged in student and normalizes it.
    pub fn fetch_timetable(&self, range: &DateRange) -> Result<Timetable, UntisError> {
        let user_data = self.fetch_master_data(range)?;
        let student_id = rpc::student_element_id(&user_data)?;

        let result: Value = self.call(&rpc::timetable_request(self.auth()?, student_id, range))?;
        let timetable = timetable::normalize(RawTimetableResult::from_value(result)?)?;
        info!(periods = timetable.periods.len(), "Normalized timetable");

        Ok(timetable)
    }

    /// Homeworks due on the day of their lesson within `range`.
    pub fn fetch_homeworks(&self, range: &DateRange) -> Result<Vec<Homework>, UntisError> {
        let timetable = self.fetch_timetable(range)?;

        Ok(timetable::collect_homeworks(&timetable.periods))
    }

    /// Lesson texts within `range`.
    pub fn fetch_text(&self, range: &DateRange) -> Result<Vec<Value>, UntisError> {
        let timetable = self.fetch_timetable(range)?;

        Ok(timetable::collect_texts(&timetable.periods))
    }
}
