//! Order line items and the pet/case split.
//!
//! A checkout cart can mix custom pet artwork with ordinary phone cases. The
//! two are fulfilled separately, so a cart is split into at most one
//! [`OrderGroup`] per [`ItemCategory`] before it is persisted.

use serde::{Deserialize, Serialize};

use crate::types::{ItemCategory, Money, MoneyError, PetProductId};

/// A line item embedded in an order.
///
/// Line items are copied into the order document at checkout and never
/// change afterwards, even if the referenced catalog product does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Catalog product this item was made from, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<PetProductId>,
    /// Display name.
    pub name: String,
    /// Main image payload (data URL or remote URL).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Additional image payloads (e.g. the original pet photos).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<String>,
    /// Customization text entered by the customer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_text: Option<String>,
    /// Unit price.
    pub price: Money,
    /// Number of units, at least 1.
    pub quantity: u32,
    /// Explicit category tag from the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<ItemCategory>,
}

impl LineItem {
    /// Classify this item as a pet asset or a phone case.
    ///
    /// An explicit `category` always wins. Untagged items fall back to the
    /// legacy rule: any non-blank customization text, or a name containing
    /// "pet" (ASCII case-insensitive), marks a pet asset.
    #[must_use]
    pub fn classify(&self) -> ItemCategory {
        if let Some(category) = self.category {
            return category;
        }

        let has_custom_text = self
            .custom_text
            .as_deref()
            .is_some_and(|text| !text.trim().is_empty());

        if has_custom_text || self.name.to_ascii_lowercase().contains("pet") {
            ItemCategory::PetAsset
        } else {
            ItemCategory::PhoneCase
        }
    }

    /// `price * quantity`.
    ///
    /// # Errors
    ///
    /// Returns `MoneyError::TooLarge` if the product is out of range.
    pub fn line_total(&self) -> Result<Money, MoneyError> {
        self.price.checked_times(self.quantity)
    }
}

/// A non-empty set of line items that share a category.
///
/// The total is computed from the items when the group is built, so it cannot
/// disagree with them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderGroup {
    category: ItemCategory,
    items: Vec<LineItem>,
    total: Money,
}

impl OrderGroup {
    /// The category every item in this group was classified as.
    #[must_use]
    pub const fn category(&self) -> ItemCategory {
        self.category
    }

    /// The items, in cart order.
    #[must_use]
    pub fn items(&self) -> &[LineItem] {
        &self.items
    }

    /// Consume the group and return its items.
    #[must_use]
    pub fn into_items(self) -> Vec<LineItem> {
        self.items
    }

    /// Sum of `price * quantity` over the group's items.
    #[must_use]
    pub const fn total(&self) -> Money {
        self.total
    }

    fn new(category: ItemCategory, items: Vec<LineItem>) -> Result<Self, MoneyError> {
        let line_totals = items
            .iter()
            .map(LineItem::line_total)
            .collect::<Result<Vec<_>, _>>()?;
        let total = Money::checked_sum(line_totals)?;
        Ok(Self {
            category,
            items,
            total,
        })
    }
}

/// Split cart items into per-category groups.
///
/// Returns at most two groups, pet assets first, and never an empty group.
/// Items keep their relative cart order within a group.
///
/// # Errors
///
/// Returns `MoneyError::TooLarge` if a line or group total is out of range.
pub fn split_items(items: Vec<LineItem>) -> Result<Vec<OrderGroup>, MoneyError> {
    let (pet, case): (Vec<_>, Vec<_>) = items
        .into_iter()
        .partition(|item| item.classify() == ItemCategory::PetAsset);

    [
        (ItemCategory::PetAsset, pet),
        (ItemCategory::PhoneCase, case),
    ]
    .into_iter()
    .filter(|(_, items)| !items.is_empty())
    .map(|(category, items)| OrderGroup::new(category, items))
    .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(name: &str, cents: u32, quantity: u32) -> LineItem {
        LineItem {
            product_id: None,
            name: name.to_owned(),
            image: None,
            images: Vec::new(),
            custom_text: None,
            price: Money::from_cents(cents),
            quantity,
            category: None,
        }
    }

    #[test]
    fn test_explicit_category_overrides_heuristic() {
        let mut tagged_case = item("Pet Portrait Case", 2500, 1);
        tagged_case.custom_text = Some("Biscuit".to_owned());
        tagged_case.category = Some(ItemCategory::PhoneCase);
        assert_eq!(tagged_case.classify(), ItemCategory::PhoneCase);

        let mut tagged_pet = item("Clear Case", 1500, 1);
        tagged_pet.category = Some(ItemCategory::PetAsset);
        assert_eq!(tagged_pet.classify(), ItemCategory::PetAsset);
    }

    #[test]
    fn test_plain_item_is_phone_case() {
        assert_eq!(item("Clear Case", 1500, 1).classify(), ItemCategory::PhoneCase);
    }

    #[test]
    fn test_custom_text_marks_pet_asset() {
        let mut custom = item("Clear Case", 1500, 1);
        custom.custom_text = Some("Luna".to_owned());
        assert_eq!(custom.classify(), ItemCategory::PetAsset);
    }

    #[test]
    fn test_blank_custom_text_ignored() {
        let mut blank = item("Clear Case", 1500, 1);
        blank.custom_text = Some("   ".to_owned());
        assert_eq!(blank.classify(), ItemCategory::PhoneCase);
    }

    #[test]
    fn test_name_containing_pet_any_case() {
        assert_eq!(item("PET sticker", 500, 1).classify(), ItemCategory::PetAsset);
        assert_eq!(item("Custom Petcam", 500, 1).classify(), ItemCategory::PetAsset);
    }

    #[test]
    fn test_split_mixed_cart() {
        let mut pet = item("Pet portrait", 3000, 1);
        pet.custom_text = Some("Mochi".to_owned());
        let cart = vec![item("Clear Case", 1500, 2), pet.clone(), item("Matte Case", 1000, 1)];

        let groups = split_items(cart).unwrap();
        assert_eq!(groups.len(), 2);

        let pet_group = &groups[0];
        assert_eq!(pet_group.category(), ItemCategory::PetAsset);
        assert_eq!(pet_group.items(), &[pet]);
        assert_eq!(pet_group.total(), Money::from_cents(3000));

        let case_group = &groups[1];
        assert_eq!(case_group.category(), ItemCategory::PhoneCase);
        let names: Vec<_> = case_group.items().iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["Clear Case", "Matte Case"]);
        assert_eq!(case_group.total(), Money::from_cents(4000));
    }

    #[test]
    fn test_split_single_category_yields_one_group() {
        let groups =
            split_items(vec![item("Clear Case", 1500, 1), item("Matte Case", 900, 3)]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].category(), ItemCategory::PhoneCase);
        assert_eq!(groups[0].total(), Money::from_cents(4200));
    }

    #[test]
    fn test_split_empty_cart_yields_nothing() {
        assert!(split_items(Vec::new()).unwrap().is_empty());
    }

    #[test]
    fn test_split_rejects_group_total_out_of_range() {
        let price = Money::new(rust_decimal::Decimal::new(6_000_000_000, 0)).unwrap();
        let mut a = item("Clear Case", 0, 1);
        a.price = price;
        let mut b = a.clone();
        b.name = "Matte Case".to_owned();

        assert!(a.line_total().is_ok());
        assert_eq!(split_items(vec![a, b]), Err(MoneyError::TooLarge));
    }

    #[test]
    fn test_split_preserves_every_item_once() {
        let cart: Vec<_> = (0..6)
            .map(|i| {
                let mut it = item(&format!("Item {i}"), 100 * (i + 1), 1);
                if i % 2 == 0 {
                    it.category = Some(ItemCategory::PetAsset);
                }
                it
            })
            .collect();

        let mut out: Vec<_> = split_items(cart.clone())
            .unwrap()
            .into_iter()
            .flat_map(OrderGroup::into_items)
            .collect();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        assert_eq!(out, cart);
    }
}
