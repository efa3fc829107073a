// In-memory connection registry with group fan-out

use std::collections::{HashMap, HashSet};

use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::auth::{AuthenticatedUser, Role};
use crate::notifications::models::ServerMessage;

pub type ConnectionId = Uuid;

pub fn role_group(role: Role) -> String {
    format!("role:{}", role)
}

pub fn user_group(user_id: i32) -> String {
    format!("user:{}", user_id)
}

pub fn facility_group(facility_id: i32) -> String {
    format!("facility:{}", facility_id)
}

struct Connection {
    user_id: i32,
    sender: mpsc::UnboundedSender<ServerMessage>,
}

#[derive(Default)]
struct HubState {
    connections: HashMap<ConnectionId, Connection>,
    /// user id -> live connections of that user
    users: HashMap<i32, HashSet<ConnectionId>>,
    groups: HashMap<String, HashSet<ConnectionId>>,
}

impl HubState {
    fn add_to_group(&mut self, id: ConnectionId, group: String) {
        self.groups.entry(group).or_default().insert(id);
    }

    fn remove_from_group(&mut self, id: &ConnectionId, group: &str) {
        if let Some(members) = self.groups.get_mut(group) {
            members.remove(id);
            if members.is_empty() {
                self.groups.remove(group);
            }
        }
    }
}

/// Notification hub shared by every socket task and by the services
#[derive(Default)]
pub struct NotificationHub {
    state: RwLock<HubState>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a connection and join its default groups
    pub async fn register(
        &self,
        user: &AuthenticatedUser,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (sender, receiver) = mpsc::unbounded_channel();

        let mut state = self.state.write().await;
        state.connections.insert(
            id,
            Connection {
                user_id: user.user_id,
                sender,
            },
        );
        state.users.entry(user.user_id).or_default().insert(id);
        state.add_to_group(id, role_group(user.role));
        state.add_to_group(id, user_group(user.user_id));
        if let (Role::Staff, Some(facility_id)) = (user.role, user.facility_id) {
            state.add_to_group(id, facility_group(facility_id));
        }

        tracing::debug!("Hub connection {} registered for user {}", id, user.user_id);
        (id, receiver)
    }

    /// Drop a connection from the user map and every group
    pub async fn unregister(&self, id: ConnectionId) {
        let mut state = self.state.write().await;
        let Some(connection) = state.connections.remove(&id) else {
            return;
        };

        if let Some(ids) = state.users.get_mut(&connection.user_id) {
            ids.remove(&id);
            if ids.is_empty() {
                state.users.remove(&connection.user_id);
            }
        }

        let groups: Vec<String> = state
            .groups
            .iter()
            .filter(|(_, members)| members.contains(&id))
            .map(|(name, _)| name.clone())
            .collect();
        for group in groups {
            state.remove_from_group(&id, &group);
        }

        tracing::debug!("Hub connection {} removed", id);
    }

    /// Returns false when the connection is unknown
    pub async fn join_group(&self, id: ConnectionId, group: String) -> bool {
        let mut state = self.state.write().await;
        if !state.connections.contains_key(&id) {
            return false;
        }
        state.add_to_group(id, group);
        true
    }

    pub async fn leave_group(&self, id: ConnectionId, group: &str) {
        self.state.write().await.remove_from_group(&id, group);
    }

    pub async fn send_to_connection(&self, id: ConnectionId, message: ServerMessage) -> bool {
        let state = self.state.read().await;
        state
            .connections
            .get(&id)
            .map(|c| c.sender.send(message).is_ok())
            .unwrap_or(false)
    }

    /// Returns the number of connections the message was queued for
    pub async fn send_to_group(&self, group: &str, message: &ServerMessage) -> usize {
        let state = self.state.read().await;
        let Some(members) = state.groups.get(group) else {
            return 0;
        };
        Self::deliver(&state, members.iter(), message)
    }

    pub async fn send_to_user(&self, user_id: i32, message: &ServerMessage) -> usize {
        let state = self.state.read().await;
        let Some(ids) = state.users.get(&user_id) else {
            return 0;
        };
        Self::deliver(&state, ids.iter(), message)
    }

    /// Route a domain event to its facility, the admins and the booking's customer.
    /// A connection sitting in several target groups receives the event once.
    pub async fn notify(&self, message: ServerMessage) -> usize {
        let Some((facility_id, customer_id)) = message.audience() else {
            return 0;
        };

        let mut targets = vec![facility_group(facility_id), role_group(Role::Admin)];
        if let Some(customer_id) = customer_id {
            targets.push(user_group(customer_id));
        }

        let state = self.state.read().await;
        let recipients: HashSet<&ConnectionId> = targets
            .iter()
            .filter_map(|group| state.groups.get(group))
            .flat_map(|members| members.iter())
            .collect();

        let delivered = Self::deliver(&state, recipients.into_iter(), &message);
        tracing::debug!(
            "Hub event for facility {} delivered to {} connection(s)",
            facility_id,
            delivered
        );
        delivered
    }

    pub async fn connection_count(&self) -> usize {
        self.state.read().await.connections.len()
    }

    pub async fn group_size(&self, group: &str) -> usize {
        self.state
            .read()
            .await
            .groups
            .get(group)
            .map(|members| members.len())
            .unwrap_or(0)
    }

    fn deliver<'a>(
        state: &HubState,
        ids: impl Iterator<Item = &'a ConnectionId>,
        message: &ServerMessage,
    ) -> usize {
        ids.filter_map(|id| state.connections.get(id))
            .filter(|c| c.sender.send(message.clone()).is_ok())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bookings::models::BookingStatus;
    use chrono::Utc;

    fn user(user_id: i32, role: Role, facility_id: Option<i32>) -> AuthenticatedUser {
        AuthenticatedUser {
            user_id,
            email: format!("u{}@example.com", user_id),
            role,
            facility_id,
        }
    }

    fn status_event(facility_id: i32, customer_id: Option<i32>) -> ServerMessage {
        ServerMessage::BookingStatusChanged {
            booking_id: 1,
            facility_id,
            customer_id,
            old_status: BookingStatus::Pending,
            new_status: BookingStatus::Confirmed,
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_register_joins_default_groups() {
        let hub = NotificationHub::new();
        let (_id, _rx) = hub.register(&user(5, Role::Staff, Some(2))).await;

        assert_eq!(hub.connection_count().await, 1);
        assert_eq!(hub.group_size("role:staff").await, 1);
        assert_eq!(hub.group_size("user:5").await, 1);
        assert_eq!(hub.group_size("facility:2").await, 1);
    }

    #[tokio::test]
    async fn test_unregister_cleans_every_group() {
        let hub = NotificationHub::new();
        let (id, _rx) = hub.register(&user(5, Role::Staff, Some(2))).await;
        assert!(hub.join_group(id, facility_group(9)).await);

        hub.unregister(id).await;

        assert_eq!(hub.connection_count().await, 0);
        assert_eq!(hub.group_size("facility:2").await, 0);
        assert_eq!(hub.group_size("facility:9").await, 0);
        assert_eq!(hub.send_to_user(5, &ServerMessage::pong()).await, 0);
    }

    #[tokio::test]
    async fn test_notify_routes_to_facility_admin_and_customer() {
        let hub = NotificationHub::new();
        let (_, mut staff_rx) = hub.register(&user(1, Role::Staff, Some(3))).await;
        let (_, mut other_staff_rx) = hub.register(&user(2, Role::Staff, Some(4))).await;
        let (_, mut admin_rx) = hub.register(&user(3, Role::Admin, None)).await;
        let (_, mut customer_rx) = hub.register(&user(4, Role::Customer, None)).await;
        let (_, mut stranger_rx) = hub.register(&user(6, Role::Customer, None)).await;

        let delivered = hub.notify(status_event(3, Some(4))).await;

        assert_eq!(delivered, 3);
        assert!(staff_rx.try_recv().is_ok());
        assert!(admin_rx.try_recv().is_ok());
        assert!(customer_rx.try_recv().is_ok());
        assert!(other_staff_rx.try_recv().is_err());
        assert!(stranger_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_notify_delivers_once_per_connection() {
        let hub = NotificationHub::new();
        let (id, mut admin_rx) = hub.register(&user(3, Role::Admin, None)).await;
        hub.join_group(id, facility_group(7)).await;

        assert_eq!(hub.notify(status_event(7, None)).await, 1);
        assert!(admin_rx.try_recv().is_ok());
        assert!(admin_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_leave_group_stops_delivery() {
        let hub = NotificationHub::new();
        let (id, mut rx) = hub.register(&user(8, Role::Owner, None)).await;
        hub.join_group(id, facility_group(2)).await;
        hub.leave_group(id, &facility_group(2)).await;

        assert_eq!(hub.notify(status_event(2, None)).await, 0);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_replies_are_not_broadcast() {
        let hub = NotificationHub::new();
        let (id, mut rx) = hub.register(&user(3, Role::Admin, None)).await;
        assert_eq!(hub.notify(ServerMessage::pong()).await, 0);
        assert!(hub.send_to_connection(id, ServerMessage::pong()).await);
        assert!(matches!(rx.try_recv(), Ok(ServerMessage::Pong { .. })));
    }

    #[tokio::test]
    async fn test_join_unknown_connection_fails() {
        let hub = NotificationHub::new();
        assert!(!hub.join_group(Uuid::new_v4(), facility_group(1)).await);
    }
}
