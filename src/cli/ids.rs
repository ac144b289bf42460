//! Resource identifiers
//!
//! Every API object carries its type in its id prefix (`tfr_`, `inv_`, ...).
//! Classification tries the longest prefixes first, so `card_holder_x` is a
//! cardholder and not a card. Composite ids name a child under its parent as
//! `parent:child`.

use std::cmp::Reverse;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::cli::BIN_NAME;
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ResourceKind {
    Account,
    Transfer,
    Beneficiary,
    Card,
    Cardholder,
    Invoice,
    Subscription,
    Webhook,
    Report,
}

impl ResourceKind {
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            ResourceKind::Account => "acc_",
            ResourceKind::Transfer => "tfr_",
            ResourceKind::Beneficiary => "ben_",
            ResourceKind::Card => "card_",
            ResourceKind::Cardholder => "card_holder_",
            ResourceKind::Invoice => "inv_",
            ResourceKind::Subscription => "sub_",
            ResourceKind::Webhook => "wh_",
            ResourceKind::Report => "rpt_",
        }
    }

    /// Sub-command path of the resource's command group
    #[must_use]
    pub fn command_path(self) -> &'static [&'static str] {
        match self {
            ResourceKind::Account => &["accounts"],
            ResourceKind::Transfer => &["transfers"],
            ResourceKind::Beneficiary => &["beneficiaries"],
            ResourceKind::Card => &["cards"],
            ResourceKind::Cardholder => &["cardholders"],
            ResourceKind::Invoice => &["billing", "invoices"],
            ResourceKind::Subscription => &["billing", "subscriptions"],
            ResourceKind::Webhook => &["webhooks"],
            ResourceKind::Report => &["reports"],
        }
    }

    #[must_use]
    pub fn is_cancelable(self) -> bool {
        matches!(
            self,
            ResourceKind::Transfer | ResourceKind::Invoice | ResourceKind::Subscription
        )
    }

    /// All kinds, longest prefix first
    #[must_use]
    pub fn by_specificity() -> Vec<ResourceKind> {
        let mut kinds: Vec<ResourceKind> = Self::iter().collect();
        kinds.sort_by_key(|kind| Reverse(kind.prefix().len()));
        kinds
    }

    /// The kind whose prefix `id` starts with. The prefix alone is not an id.
    #[must_use]
    pub fn classify(id: &str) -> Option<ResourceKind> {
        let kinds = Self::by_specificity();
        if kinds.iter().any(|kind| kind.prefix() == id) {
            return None;
        }
        kinds
            .into_iter()
            .find(|kind| id.len() > kind.prefix().len() && id.starts_with(kind.prefix()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
pub enum CompositeKind {
    InvoiceItem,
    SubscriptionItem,
}

impl CompositeKind {
    #[must_use]
    pub fn parent(self) -> ResourceKind {
        match self {
            CompositeKind::InvoiceItem => ResourceKind::Invoice,
            CompositeKind::SubscriptionItem => ResourceKind::Subscription,
        }
    }

    #[must_use]
    pub fn child_prefix(self) -> &'static str {
        match self {
            CompositeKind::InvoiceItem => "item_",
            CompositeKind::SubscriptionItem => "si_",
        }
    }

    #[must_use]
    pub fn command_path(self) -> &'static [&'static str] {
        match self {
            CompositeKind::InvoiceItem => &["billing", "invoices", "items"],
            CompositeKind::SubscriptionItem => &["billing", "subscriptions", "items"],
        }
    }

    /// e.g. `inv_…:item_…, sub_…:si_…`
    #[must_use]
    pub fn shapes() -> String {
        Self::iter()
            .map(|kind| format!("{}…:{}…", kind.parent().prefix(), kind.child_prefix()))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceId {
    Simple {
        kind: ResourceKind,
        id: String,
    },
    Composite {
        kind: CompositeKind,
        parent: String,
        child: String,
    },
}

impl ResourceId {
    /// Classify an identifier.
    ///
    /// # Errors
    /// [`AppError::UnknownCompositeId`] for a `parent:child` id with no known
    /// parent prefix or an empty half, [`AppError::UnknownId`] for an
    /// unrecognised simple id.
    pub fn parse(raw: &str) -> Result<Self, AppError> {
        let raw = raw.trim();

        if let Some((parent, child)) = raw.split_once(':') {
            let (parent, child) = (clean(parent), clean(child));
            let kind = CompositeKind::iter().find(|kind| {
                let prefix = kind.parent().prefix();
                parent.len() > prefix.len() && parent.starts_with(prefix)
            });
            return match kind {
                Some(kind) if !child.is_empty() => Ok(ResourceId::Composite {
                    kind,
                    parent: parent.to_string(),
                    child: child.to_string(),
                }),
                _ => Err(AppError::UnknownCompositeId {
                    id: raw.to_string(),
                    expected: CompositeKind::shapes(),
                }),
            };
        }

        let id = clean(raw);
        ResourceKind::classify(id)
            .map(|kind| ResourceId::Simple {
                kind,
                id: id.to_string(),
            })
            .ok_or_else(|| AppError::UnknownId {
                id: raw.to_string(),
                supported: supported_prefixes(),
            })
    }

    #[must_use]
    pub fn command_path(&self) -> &'static [&'static str] {
        match self {
            ResourceId::Simple { kind, .. } => kind.command_path(),
            ResourceId::Composite { kind, .. } => kind.command_path(),
        }
    }

    /// The ids as positional arguments, parent first
    #[must_use]
    pub fn args(&self) -> Vec<String> {
        match self {
            ResourceId::Simple { id, .. } => vec![id.clone()],
            ResourceId::Composite { parent, child, .. } => vec![parent.clone(), child.clone()],
        }
    }

    /// The canonical invocation of `verb` on this resource, e.g.
    /// `pay billing invoices items get inv_1 item_2`
    #[must_use]
    pub fn command(&self, verb: &str) -> String {
        let mut words: Vec<String> = std::iter::once(BIN_NAME)
            .chain(self.command_path().iter().copied())
            .chain(std::iter::once(verb))
            .map(ToString::to_string)
            .collect();
        words.extend(self.args());
        words.join(" ")
    }
}

fn clean(part: &str) -> &str {
    part.trim().trim_end_matches('/').trim_end()
}

/// Every simple id prefix, for error messages
#[must_use]
pub fn supported_prefixes() -> String {
    ResourceKind::iter()
        .map(ResourceKind::prefix)
        .collect::<Vec<_>>()
        .join(", ")
}

#[must_use]
pub fn cancelable_prefixes() -> String {
    ResourceKind::iter()
        .filter(|kind| kind.is_cancelable())
        .map(ResourceKind::prefix)
        .collect::<Vec<_>>()
        .join(", ")
}

// -- Tests ---------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn longest_prefix_wins() {
        assert_eq!(
            ResourceKind::classify("card_holder_xyz"),
            Some(ResourceKind::Cardholder)
        );
        assert_eq!(ResourceKind::classify("card_123"), Some(ResourceKind::Card));
    }

    #[test]
    fn extending_prefixes_are_tried_first() {
        let kinds = ResourceKind::by_specificity();

        for (i, earlier) in kinds.iter().enumerate() {
            for later in &kinds[i + 1..] {
                assert!(
                    !later.prefix().starts_with(earlier.prefix()) || later == earlier,
                    "{later} is shadowed by {earlier}"
                );
            }
        }
    }

    #[test]
    fn bare_prefix_is_not_an_id() {
        let err = ResourceId::parse("tfr_").unwrap_err();

        assert!(matches!(err, AppError::UnknownId { .. }));
    }

    #[test]
    fn bare_longer_prefix_does_not_fall_back_to_a_shorter_one() {
        assert_eq!(ResourceKind::classify("card_holder_"), None);
        assert_eq!(ResourceKind::classify("card_holder_1"), Some(ResourceKind::Cardholder));
        assert_eq!(ResourceKind::classify("card_1"), Some(ResourceKind::Card));
    }

    #[test]
    fn unknown_prefix_lists_every_prefix() {
        let err = ResourceId::parse("xyz_1").unwrap_err();

        assert_eq!(
            err.to_string(),
            "Unknown id \"xyz_1\": supported prefixes are \
             acc_, tfr_, ben_, card_, card_holder_, inv_, sub_, wh_, rpt_"
        );
    }

    #[test]
    fn composite_halves_are_trimmed() {
        // Act
        let id = ResourceId::parse(" inv_1/ : item_2/ ").unwrap();

        // Assert
        assert_eq!(
            id,
            ResourceId::Composite {
                kind: CompositeKind::InvoiceItem,
                parent: "inv_1".to_string(),
                child: "item_2".to_string(),
            }
        );
        assert_eq!(id.command("get"), "pay billing invoices items get inv_1 item_2");
    }

    #[test]
    fn composite_with_unknown_parent_names_shapes() {
        let err = ResourceId::parse("tfr_1:item_2").unwrap_err();

        assert!(
            matches!(err, AppError::UnknownCompositeId { expected, .. } if expected == "inv_…:item_…, sub_…:si_…")
        );
    }

    #[test]
    fn composite_with_empty_child_is_rejected() {
        let err = ResourceId::parse("sub_1:").unwrap_err();

        assert!(matches!(err, AppError::UnknownCompositeId { .. }));
    }

    #[test]
    fn only_transfers_invoices_and_subscriptions_cancel() {
        assert_eq!(cancelable_prefixes(), "tfr_, inv_, sub_");
    }
}
