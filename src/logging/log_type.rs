//! Bitmask log categories.
//!
//! A [`LogType`] is a set of leaf categories. Presets are unions of leaves,
//! and the zero value [`LogType::APP_ROOT`] is the sentinel used by
//! application-level logging: it passes every filter.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};
use std::str::FromStr;

/// Set of log categories, stored as bit flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogType(u32);

impl LogType {
    /// Application root logging; matches every filter.
    pub const APP_ROOT: LogType = LogType(0);

    pub const ENDPOINT_ENTER: LogType = LogType(1 << 0);
    pub const ENDPOINT_REQUEST: LogType = LogType(1 << 1);
    pub const ENDPOINT_RESPONSE: LogType = LogType(1 << 2);
    pub const ENDPOINT_EXIT: LogType = LogType(1 << 3);
    pub const METHOD_ENTER: LogType = LogType(1 << 4);
    pub const METHOD_PARAMETER: LogType = LogType(1 << 5);
    pub const METHOD_LOGIC: LogType = LogType(1 << 6);
    pub const METHOD_RETURN: LogType = LogType(1 << 7);
    pub const METHOD_EXIT: LogType = LogType(1 << 8);
    pub const WEBCALL_START: LogType = LogType(1 << 9);
    pub const WEBCALL_REQUEST: LogType = LogType(1 << 10);
    pub const WEBCALL_RESPONSE: LogType = LogType(1 << 11);
    pub const WEBCALL_FINISH: LogType = LogType(1 << 12);

    pub const BASIC_TRACING: LogType = Self::METHOD_LOGIC;
    pub const GENERAL_TRACING: LogType = Self::BASIC_TRACING
        .union(Self::ENDPOINT_ENTER)
        .union(Self::ENDPOINT_EXIT);
    pub const VERBOSE_TRACING: LogType = Self::GENERAL_TRACING
        .union(Self::WEBCALL_START)
        .union(Self::WEBCALL_FINISH);
    pub const FULL_TRACING: LogType = Self::VERBOSE_TRACING
        .union(Self::METHOD_ENTER)
        .union(Self::METHOD_EXIT);

    pub const BASIC_DEBUGGING: LogType = Self::METHOD_LOGIC;
    pub const GENERAL_DEBUGGING: LogType = Self::BASIC_DEBUGGING
        .union(Self::ENDPOINT_REQUEST)
        .union(Self::ENDPOINT_RESPONSE);
    pub const VERBOSE_DEBUGGING: LogType = Self::GENERAL_DEBUGGING
        .union(Self::WEBCALL_REQUEST)
        .union(Self::WEBCALL_RESPONSE);
    pub const FULL_DEBUGGING: LogType = Self::VERBOSE_DEBUGGING
        .union(Self::METHOD_PARAMETER)
        .union(Self::METHOD_RETURN);

    pub const BASIC_LOGGING: LogType = Self::BASIC_TRACING.union(Self::BASIC_DEBUGGING);
    pub const GENERAL_LOGGING: LogType = Self::BASIC_LOGGING
        .union(Self::GENERAL_TRACING)
        .union(Self::GENERAL_DEBUGGING);
    pub const VERBOSE_LOGGING: LogType = Self::GENERAL_LOGGING
        .union(Self::VERBOSE_TRACING)
        .union(Self::VERBOSE_DEBUGGING);
    pub const FULL_LOGGING: LogType = Self::VERBOSE_LOGGING
        .union(Self::FULL_TRACING)
        .union(Self::FULL_DEBUGGING);

    /// Leaf categories in declaration order.
    const LEAVES: [(LogType, &'static str); 13] = [
        (Self::ENDPOINT_ENTER, "EndpointEnter"),
        (Self::ENDPOINT_REQUEST, "EndpointRequest"),
        (Self::ENDPOINT_RESPONSE, "EndpointResponse"),
        (Self::ENDPOINT_EXIT, "EndpointExit"),
        (Self::METHOD_ENTER, "MethodEnter"),
        (Self::METHOD_PARAMETER, "MethodParameter"),
        (Self::METHOD_LOGIC, "MethodLogic"),
        (Self::METHOD_RETURN, "MethodReturn"),
        (Self::METHOD_EXIT, "MethodExit"),
        (Self::WEBCALL_START, "WebcallStart"),
        (Self::WEBCALL_REQUEST, "WebcallRequest"),
        (Self::WEBCALL_RESPONSE, "WebcallResponse"),
        (Self::WEBCALL_FINISH, "WebcallFinish"),
    ];

    /// Named presets accepted when parsing, largest first.
    const PRESETS: [(LogType, &'static str); 13] = [
        (Self::FULL_LOGGING, "FullLogging"),
        (Self::VERBOSE_LOGGING, "VerboseLogging"),
        (Self::GENERAL_LOGGING, "GeneralLogging"),
        (Self::BASIC_LOGGING, "BasicLogging"),
        (Self::FULL_TRACING, "FullTracing"),
        (Self::VERBOSE_TRACING, "VerboseTracing"),
        (Self::GENERAL_TRACING, "GeneralTracing"),
        (Self::BASIC_TRACING, "BasicTracing"),
        (Self::FULL_DEBUGGING, "FullDebugging"),
        (Self::VERBOSE_DEBUGGING, "VerboseDebugging"),
        (Self::GENERAL_DEBUGGING, "GeneralDebugging"),
        (Self::BASIC_DEBUGGING, "BasicDebugging"),
        (Self::APP_ROOT, "AppRoot"),
    ];

    /// Union of two sets, usable in constant expressions.
    pub const fn union(self, other: LogType) -> LogType {
        LogType(self.0 | other.0)
    }

    /// Raw bit representation.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True for the zero-value application root sentinel.
    pub const fn is_app_root(self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is present in `self`.
    pub const fn contains(self, other: LogType) -> bool {
        self.0 & other.0 == other.0
    }

    /// Whether an entry of this type passes `filter`.
    ///
    /// The application root sentinel always passes; any other type passes
    /// when it shares at least one category with the filter.
    pub const fn is_enabled_in(self, filter: LogType) -> bool {
        self.is_app_root() || self.0 & filter.0 != 0
    }

    /// Leaf names contained in this set, in declaration order.
    pub fn leaf_names(self) -> Vec<&'static str> {
        Self::LEAVES
            .iter()
            .filter(|(leaf, _)| self.contains(*leaf))
            .map(|(_, name)| *name)
            .collect()
    }
}

impl BitOr for LogType {
    type Output = LogType;

    fn bitor(self, rhs: LogType) -> LogType {
        self.union(rhs)
    }
}

impl BitOrAssign for LogType {
    fn bitor_assign(&mut self, rhs: LogType) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LogType {
    type Output = LogType;

    fn bitand(self, rhs: LogType) -> LogType {
        LogType(self.0 & rhs.0)
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_app_root() {
            return f.write_str("AppRoot");
        }
        f.write_str(&self.leaf_names().join("|"))
    }
}

/// Error returned when a log type name is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown log type: {0}")]
pub struct ParseLogTypeError(pub String);

impl FromStr for LogType {
    type Err = ParseLogTypeError;

    /// Parses `|`-separated leaf and preset names, e.g. `GeneralTracing|WebcallRequest`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parsed = LogType::APP_ROOT;
        for token in s.split('|').map(str::trim).filter(|t| !t.is_empty()) {
            let found = Self::LEAVES
                .iter()
                .chain(Self::PRESETS.iter())
                .find(|(_, name)| name.eq_ignore_ascii_case(token))
                .map(|(value, _)| *value)
                .ok_or_else(|| ParseLogTypeError(token.to_string()))?;
            parsed |= found;
        }
        Ok(parsed)
    }
}

impl Serialize for LogType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for LogType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
