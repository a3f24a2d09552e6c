//! Host-platform collaborators.
//!
//! The checkout platform owns these records. The gateway reads them to build
//! provider requests and never writes to them: a void that changes the
//! payment source's status hands back a [`VoidCompleted`] event for the host
//! to apply.

use serde::{Deserialize, Serialize};

/// Status recorded on a payment source once its lease is terminated.
pub const REFUNDED_STATUS: &str = "REFUNDED";

/// Lease (financing contract) identifier assigned by Acima.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeaseId(pub String);

/// Short-lived token issued by the hosted checkout iframe.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CheckoutToken(pub String);

impl LeaseId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl CheckoutToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for LeaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::fmt::Display for CheckoutToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LeaseId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<&str> for CheckoutToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Payment source produced by the iframe checkout flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentSource {
    pub lease_id: LeaseId,
    pub checkout_token: CheckoutToken,
    #[serde(default)]
    pub status: Option<String>,
    /// The record's full attribute mapping, echoed back by `authorize`.
    #[serde(default)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

impl PaymentSource {
    pub fn new(lease_id: impl Into<String>, checkout_token: impl Into<String>) -> Self {
        Self {
            lease_id: LeaseId(lease_id.into()),
            checkout_token: CheckoutToken(checkout_token.into()),
            status: None,
            attributes: serde_json::Map::new(),
        }
    }

    pub fn with_attributes(mut self, attributes: serde_json::Map<String, serde_json::Value>) -> Self {
        self.attributes = attributes;
        self
    }

    /// Apply a completed void to this record.
    ///
    /// Events for a different lease are ignored and `false` is returned.
    pub fn apply(&mut self, event: &VoidCompleted) -> bool {
        if event.lease_id != self.lease_id {
            tracing::warn!(
                lease_id = %self.lease_id,
                event_lease_id = %event.lease_id,
                "ignoring void event for a different lease"
            );
            return false;
        }
        self.status = Some(event.new_status.clone());
        true
    }
}

/// Host order that carries the payload stored during checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Order {
    #[serde(default)]
    pub number: Option<String>,
    /// Transaction payload captured from the iframe, forwarded on finalize.
    #[serde(default)]
    pub acima_transaction: Option<serde_json::Value>,
}

/// The host object a payment operation originates from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Originator {
    pub source: PaymentSource,
    #[serde(default)]
    pub order: Option<Order>,
}

impl Originator {
    pub fn new(source: PaymentSource) -> Self {
        Self { source, order: None }
    }

    pub fn with_order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }
}

/// Generic options passed with every gateway operation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GatewayOptions {
    #[serde(default)]
    pub originator: Option<Originator>,
}

impl GatewayOptions {
    pub fn for_originator(originator: Originator) -> Self {
        Self {
            originator: Some(originator),
        }
    }

    pub(crate) fn require_originator(
        &self,
        operation: &'static str,
    ) -> Result<&Originator, crate::GatewayError> {
        self.originator
            .as_ref()
            .ok_or(crate::GatewayError::MissingOriginator { operation })
    }
}

/// A void finished and the host should record the new status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidCompleted {
    pub lease_id: LeaseId,
    pub new_status: String,
}

impl VoidCompleted {
    pub(crate) fn refunded(lease_id: LeaseId) -> Self {
        Self {
            lease_id,
            new_status: REFUNDED_STATUS.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_sets_refunded_status() {
        let mut source = PaymentSource::new("lease-1", "tok-1");
        let applied = source.apply(&VoidCompleted::refunded(LeaseId::from("lease-1")));
        assert!(applied);
        assert_eq!(source.status.as_deref(), Some(REFUNDED_STATUS));
    }

    #[test]
    fn apply_ignores_other_lease() {
        let mut source = PaymentSource::new("lease-1", "tok-1");
        let applied = source.apply(&VoidCompleted::refunded(LeaseId::from("lease-2")));
        assert!(!applied);
        assert!(source.status.is_none());
    }

    #[test]
    fn require_originator_reports_operation() {
        let err = GatewayOptions::default().require_originator("void").unwrap_err();
        assert!(matches!(
            err,
            crate::GatewayError::MissingOriginator { operation: "void" }
        ));
    }

    #[test]
    fn payment_source_deserializes_with_defaults() {
        let source: PaymentSource = serde_json::from_value(serde_json::json!({
            "lease_id": "L-100",
            "checkout_token": "ct-100"
        }))
        .unwrap();
        assert_eq!(source.lease_id.as_str(), "L-100");
        assert!(source.attributes.is_empty());
        assert!(source.status.is_none());
    }
}
