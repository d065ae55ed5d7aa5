// Tick event subscriptions: who runs before and during each simulation step.

use crate::domain::state::{BulletId, TankId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickPhase {
    /// Runs first; bullets watch for tank contact here.
    BeforeTick,
    /// Runs after `BeforeTick`; tanks drive and separate here.
    Tick,
}

/// Handler to invoke for a subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Subscriber {
    Tank(TankId),
    BulletWatch(BulletId),
}

#[derive(Debug, Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<(SubscriptionId, TickPhase, Subscriber)>,
}

impl EventBus {
    pub fn subscribe(&mut self, phase: TickPhase, subscriber: Subscriber) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscriptions.push((id, phase, subscriber));
        id
    }

    /// Returns false when the subscription was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|(sub, _, _)| *sub != id);
        self.subscriptions.len() != before
    }

    pub fn is_subscribed(&self, id: SubscriptionId) -> bool {
        self.subscriptions.iter().any(|(sub, _, _)| *sub == id)
    }

    /// Subscribers of `phase` in registration order, copied so handlers may unsubscribe freely.
    pub fn subscribers(&self, phase: TickPhase) -> Vec<(SubscriptionId, Subscriber)> {
        self.subscriptions
            .iter()
            .filter(|(_, p, _)| *p == phase)
            .map(|(id, _, subscriber)| (*id, *subscriber))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_subscribers_are_listed_then_phase_and_order_are_kept() {
        let mut bus = EventBus::default();
        let first = bus.subscribe(TickPhase::Tick, Subscriber::Tank(TankId(1)));
        bus.subscribe(TickPhase::BeforeTick, Subscriber::BulletWatch(BulletId(7)));
        let second = bus.subscribe(TickPhase::Tick, Subscriber::Tank(TankId(2)));

        let tick = bus.subscribers(TickPhase::Tick);

        assert_eq!(
            tick,
            vec![
                (first, Subscriber::Tank(TankId(1))),
                (second, Subscriber::Tank(TankId(2)))
            ]
        );
        assert_eq!(bus.subscribers(TickPhase::BeforeTick).len(), 1);
    }

    #[test]
    fn when_unsubscribed_twice_then_second_call_reports_false() {
        let mut bus = EventBus::default();
        let id = bus.subscribe(TickPhase::BeforeTick, Subscriber::BulletWatch(BulletId(1)));

        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        assert!(!bus.is_subscribed(id));
        assert!(bus.is_empty());
    }
}
