use serde::{Deserialize, Serialize};
use std::str::FromStr;
use ts_rs::TS;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export, export_to = "../../../frontend/src/lib/types/")]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    #[default]
    Free,
    Held,
    Booked,
}

impl FromStr for SeatStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "held" => Ok(Self::Held),
            "booked" => Ok(Self::Booked),
            "free" | _ => Ok(Self::Free),
        }
    }
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Held => "held",
            Self::Booked => "booked",
        }
    }
}

/// Booking lifecycle. A booking is created PENDING, holding its seats, and
/// converges to exactly one terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export, export_to = "../../../frontend/src/lib/types/")]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Cancelled,
}

impl FromStr for BookingStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(Self::Confirmed),
            "cancelled" => Ok(Self::Cancelled),
            "pending" | _ => Ok(Self::Pending),
        }
    }
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Confirmed | Self::Cancelled)
    }

    /// Whether a transition from `self` to `target` is allowed. PENDING can
    /// move to either terminal state; CONFIRMED can still move to CANCELLED
    /// via the refund path (spec §4.2) — CANCELLED itself is absorbing.
    pub fn can_transition_to(&self, target: Self) -> bool {
        match (self, target) {
            (Self::Pending, Self::Confirmed) => true,
            (Self::Pending, Self::Cancelled) => true,
            (Self::Confirmed, Self::Cancelled) => true,
            _ => false,
        }
    }
}

/// Payment lifecycle, tracked per booking attempt against a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export, export_to = "../../../frontend/src/lib/types/")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Refunded,
}

impl FromStr for PaymentStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "refunded" => Ok(Self::Refunded),
            "pending" | _ => Ok(Self::Pending),
        }
    }
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Refunded => "refunded",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Refunded)
    }

    pub fn can_transition_to(&self, target: Self) -> bool {
        match (self, target) {
            (Self::Pending, Self::Completed) => true,
            (Self::Pending, Self::Failed) => true,
            (Self::Completed, Self::Refunded) => true,
            _ => false,
        }
    }
}

/// HMAC algorithm a named gateway signs its callbacks with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export, export_to = "../../../frontend/src/lib/types/")]
#[serde(rename_all = "UPPERCASE")]
pub enum SignatureAlgorithm {
    #[default]
    HmacSha512,
    HmacSha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "HMACSHA256" | "HMAC-SHA256" => Ok(Self::HmacSha256),
            "HMACSHA512" | "HMAC-SHA512" | _ => Ok(Self::HmacSha512),
        }
    }
}
