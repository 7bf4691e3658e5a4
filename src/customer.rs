use std::fmt;

use crate::error::{MissingCustomerError, MissingCustomerReason};
use crate::request::CreationRequest;
use crate::value::{EntityReference, RecordId};

/// The kind of record a case's customer points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// An organization
    Account,
    /// An individual
    Contact,
    /// Any other entity type
    Other,
}

impl EntityKind {
    /// Classifies a logical type name. Matching is exact and lowercase, as
    /// the platform emits logical names.
    pub fn from_logical_name(logical_name: &str) -> Self {
        match logical_name {
            "account" => EntityKind::Account,
            "contact" => EntityKind::Contact,
            _ => EntityKind::Other,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Account => write!(f, "account"),
            EntityKind::Contact => write!(f, "contact"),
            EntityKind::Other => write!(f, "other"),
        }
    }
}

/// The customer a new case belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerReference {
    /// Id of the customer record
    pub id: RecordId,
    /// What kind of record the customer is
    pub entity_kind: EntityKind,
}

impl CustomerReference {
    /// Returns `true` if the open-case rule applies to this customer.
    pub fn is_account(&self) -> bool {
        self.entity_kind == EntityKind::Account
    }
}

impl From<&EntityReference> for CustomerReference {
    fn from(reference: &EntityReference) -> Self {
        Self {
            id: reference.id().clone(),
            entity_kind: EntityKind::from_logical_name(reference.logical_name()),
        }
    }
}

impl fmt::Display for CustomerReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.entity_kind, self.id)
    }
}

/// Reads and classifies the customer referenced by `field` on `request`.
///
/// # Errors
///
/// Returns `MissingCustomerError` if the field is absent or not a reference.
///
/// # Examples
///
/// ```
/// use case_admission::{resolve_customer, CreationRequest, EntityKind, EntityReference};
///
/// let request = CreationRequest::new("incident")
///     .with_field("customerid", EntityReference::new("contact", "C1"));
///
/// let customer = resolve_customer(&request, "customerid").unwrap();
/// assert_eq!(customer.entity_kind, EntityKind::Contact);
/// assert_eq!(customer.id.as_str(), "C1");
/// ```
pub fn resolve_customer(
    request: &CreationRequest,
    field: &str,
) -> Result<CustomerReference, MissingCustomerError> {
    match request.get(field) {
        Some(value) => value
            .as_reference()
            .map(CustomerReference::from)
            .ok_or_else(|| {
                MissingCustomerError::new(
                    field,
                    MissingCustomerReason::NotAReference {
                        found: value.type_name(),
                    },
                )
            }),
        None => Err(MissingCustomerError::new(field, MissingCustomerReason::Absent)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::FieldValue;

    #[test]
    fn classifies_logical_names() {
        assert_eq!(EntityKind::from_logical_name("account"), EntityKind::Account);
        assert_eq!(EntityKind::from_logical_name("contact"), EntityKind::Contact);
        assert_eq!(EntityKind::from_logical_name("systemuser"), EntityKind::Other);
        assert_eq!(EntityKind::from_logical_name("Account"), EntityKind::Other);
    }

    #[test]
    fn resolves_account_customer() {
        let request = CreationRequest::new("incident")
            .with_field("customerid", EntityReference::new("account", "A1"));

        let customer = resolve_customer(&request, "customerid").unwrap();
        assert!(customer.is_account());
        assert_eq!(customer.to_string(), "account:A1");
    }

    #[test]
    fn absent_customer_is_missing() {
        let request = CreationRequest::new("incident").with_field("title", "No customer");

        let err = resolve_customer(&request, "customerid").unwrap_err();
        assert_eq!(err.reason, MissingCustomerReason::Absent);
    }

    #[test]
    fn non_reference_customer_is_missing() {
        let request =
            CreationRequest::new("incident").with_field("customerid", FieldValue::Integer(7));

        let err = resolve_customer(&request, "customerid").unwrap_err();
        assert_eq!(
            err.reason,
            MissingCustomerReason::NotAReference { found: "integer" }
        );
    }

    #[test]
    fn other_entity_kind_is_not_account() {
        let request = CreationRequest::new("incident")
            .with_field("customerid", EntityReference::new("lead", "L1"));

        let customer = resolve_customer(&request, "customerid").unwrap();
        assert_eq!(customer.entity_kind, EntityKind::Other);
        assert!(!customer.is_account());
    }
}
