use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::bookings::models::BookingStatus;
use crate::orders::models::PaymentStatus;

/// Messages a client may send over the hub socket
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    JoinFacility { facility_id: i32 },
    LeaveFacility { facility_id: i32 },
    Ping,
}

/// Messages pushed to connected clients
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    BookingCreated {
        booking_id: i32,
        facility_id: i32,
        field_id: i32,
        customer_id: Option<i32>,
        booking_date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        status: BookingStatus,
        timestamp: DateTime<Utc>,
    },
    BookingStatusChanged {
        booking_id: i32,
        facility_id: i32,
        customer_id: Option<i32>,
        old_status: BookingStatus,
        new_status: BookingStatus,
        timestamp: DateTime<Utc>,
    },
    PaymentStatusChanged {
        order_id: i32,
        booking_id: i32,
        facility_id: i32,
        customer_id: Option<i32>,
        payment_status: PaymentStatus,
        timestamp: DateTime<Utc>,
    },
    Pong {
        timestamp: DateTime<Utc>,
    },
    Error {
        message: String,
        timestamp: DateTime<Utc>,
    },
}

impl ServerMessage {
    pub fn pong() -> Self {
        ServerMessage::Pong {
            timestamp: Utc::now(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerMessage::Error {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }

    /// (facility, customer) a domain event is about; None for replies
    pub fn audience(&self) -> Option<(i32, Option<i32>)> {
        match self {
            ServerMessage::BookingCreated {
                facility_id,
                customer_id,
                ..
            }
            | ServerMessage::BookingStatusChanged {
                facility_id,
                customer_id,
                ..
            }
            | ServerMessage::PaymentStatusChanged {
                facility_id,
                customer_id,
                ..
            } => Some((*facility_id, *customer_id)),
            ServerMessage::Pong { .. } | ServerMessage::Error { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_client_message_parsing() {
        let msg: ClientMessage =
            serde_json::from_value(json!({ "type": "join_facility", "facility_id": 4 })).unwrap();
        assert_eq!(msg, ClientMessage::JoinFacility { facility_id: 4 });

        let msg: ClientMessage = serde_json::from_value(json!({ "type": "ping" })).unwrap();
        assert_eq!(msg, ClientMessage::Ping);
    }

    #[test]
    fn test_unknown_client_message_is_rejected() {
        let parsed = serde_json::from_value::<ClientMessage>(json!({ "type": "subscribe_all" }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_server_message_is_tagged() {
        let value = serde_json::to_value(ServerMessage::BookingStatusChanged {
            booking_id: 1,
            facility_id: 2,
            customer_id: None,
            old_status: BookingStatus::Pending,
            new_status: BookingStatus::Confirmed,
            timestamp: Utc::now(),
        })
        .unwrap();
        assert_eq!(value["type"], "booking_status_changed");
        assert_eq!(value["new_status"], "confirmed");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_audience() {
        assert_eq!(ServerMessage::pong().audience(), None);
        let msg = ServerMessage::PaymentStatusChanged {
            order_id: 1,
            booking_id: 1,
            facility_id: 7,
            customer_id: Some(3),
            payment_status: PaymentStatus::Paid,
            timestamp: Utc::now(),
        };
        assert_eq!(msg.audience(), Some((7, Some(3))));
    }
}
