//! Status-range dispatch of response bodies into caller-owned targets.

use std::ops::RangeInclusive;

use serde::de::DeserializeOwned;

use crate::logging::{LogLevel, LogType};
use crate::session::{unmarshal_into, ConversionError, Session};

/// Inclusive range of HTTP status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusCodeRange {
    pub begin: u16,
    pub end: u16,
}

impl StatusCodeRange {
    /// Every status code a server can send.
    pub const ANY: StatusCodeRange = StatusCodeRange { begin: 0, end: 999 };

    pub fn contains(&self, status: u16) -> bool {
        self.begin <= status && status <= self.end
    }
}

impl From<u16> for StatusCodeRange {
    fn from(code: u16) -> Self {
        Self { begin: code, end: code }
    }
}

impl From<RangeInclusive<u16>> for StatusCodeRange {
    fn from(range: RangeInclusive<u16>) -> Self {
        Self {
            begin: *range.start(),
            end: *range.end(),
        }
    }
}

/// A target a response body can be parsed into.
pub trait DataTemplate: Send + Sync {
    fn fill(&mut self, raw: &str) -> Result<(), ConversionError>;
}

impl<T> DataTemplate for T
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    fn fill(&mut self, raw: &str) -> Result<(), ConversionError> {
        unmarshal_into(raw, self)
    }
}

/// One anticipated response shape: a target and the statuses it accepts.
pub struct DataReceiver<'a> {
    pub(crate) template: &'a mut dyn DataTemplate,
    pub(crate) ranges: Vec<StatusCodeRange>,
}

impl<'a> DataReceiver<'a> {
    /// An empty `ranges` accepts every status.
    pub fn new(template: &'a mut dyn DataTemplate, ranges: Vec<StatusCodeRange>) -> Self {
        let ranges = if ranges.is_empty() {
            vec![StatusCodeRange::ANY]
        } else {
            ranges
        };
        Self { template, ranges }
    }

    pub fn ranges(&self) -> &[StatusCodeRange] {
        &self.ranges
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.ranges.iter().any(|range| range.contains(status))
    }
}

/// First receiver, in declaration order, whose range holds `status`.
pub fn get_data_template<'r, 'a>(
    session: &Session,
    status: u16,
    receivers: &'r mut [DataReceiver<'a>],
) -> Option<&'r mut DataReceiver<'a>> {
    let found = receivers.iter_mut().find(|receiver| receiver.accepts(status));
    match &found {
        Some(receiver) => session.log(
            LogType::WEBCALL_RESPONSE,
            LogLevel::Debug,
            "Template",
            &status.to_string(),
            &format!("{:?}", receiver.ranges),
        ),
        None => session.log(
            LogType::WEBCALL_RESPONSE,
            LogLevel::Debug,
            "Template",
            &status.to_string(),
            "None",
        ),
    }
    found
}
