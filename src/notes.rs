//! Currency-note tally.
//!
//! The built-in notes are always present. Tellers may register extra
//! denominations; those get a stable `customNote<N>` id and can be removed
//! again. A value can only be registered once across both sets.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{in_range, CalcError, Result};
use crate::format::{format_amount, format_currency, CURRENCY_SIGN};

/// Built-in notes, in display order.
pub const FIXED_DENOMINATIONS: [u32; 7] = [1000, 500, 200, 100, 50, 20, 10];

/// A custom denomination as persisted in settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomNote {
    pub id: String,
    pub value: Decimal,
}

/// Which of the two custom-note columns a denomination is shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    First,
    Second,
}

impl Column {
    fn for_ordinal(n: usize) -> Self {
        if n % 2 == 1 {
            Column::First
        } else {
            Column::Second
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Denomination {
    pub id: String,
    pub value: Decimal,
    pub is_custom: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TallyLine {
    pub id: String,
    pub value: Decimal,
    /// Non-positive and missing counts are recorded as zero.
    pub count: i64,
    pub subtotal: Decimal,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tally {
    pub lines: Vec<TallyLine>,
    pub grand_total: Decimal,
}

impl Tally {
    /// Human-readable lines for every denomination actually counted,
    /// e.g. `5 × ৳1000 = ৳5,000`.
    pub fn breakdown(&self) -> Vec<String> {
        self.lines
            .iter()
            .filter(|line| line.count > 0)
            .map(|line| {
                format!(
                    "{} × {}{} = {}",
                    format_amount(Decimal::from(line.count)),
                    CURRENCY_SIGN,
                    line.value.normalize(),
                    format_currency(line.subtotal)
                )
            })
            .collect()
    }
}

/// Computes per-denomination subtotals and their sum.
///
/// # Errors
///
/// Returns an error if a subtotal or the grand total does not fit in a
/// `Decimal`.
pub fn tally<'a, I>(entries: I) -> Result<Tally>
where
    I: IntoIterator<Item = (&'a Denomination, Option<i64>)>,
{
    let lines = entries
        .into_iter()
        .map(|(denomination, count)| -> Result<TallyLine> {
            let count = count.filter(|c| *c > 0).unwrap_or(0);
            let subtotal = in_range(
                "note_count",
                denomination.value.checked_mul(Decimal::from(count)),
            )?;
            Ok(TallyLine {
                id: denomination.id.clone(),
                value: denomination.value,
                count,
                subtotal,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    let grand_total = lines.iter().try_fold(Decimal::ZERO, |sum, line| {
        in_range("note_count", sum.checked_add(line.subtotal))
    })?;

    Ok(Tally { lines, grand_total })
}

/// The full set of denominations on the note-counter screen.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteCounter {
    custom: Vec<CustomNote>,
    note_counter: u32,
}

impl Default for NoteCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl NoteCounter {
    pub fn new() -> Self {
        NoteCounter {
            custom: Vec::new(),
            note_counter: 0,
        }
    }

    /// Rebuilds the set from persisted custom notes and counter.
    pub fn restore(custom: Vec<CustomNote>, note_counter: u32) -> Self {
        NoteCounter { custom, note_counter }
    }

    pub fn fixed_id(value: u32) -> String {
        format!("note{value}")
    }

    pub fn custom_notes(&self) -> &[CustomNote] {
        &self.custom
    }

    pub fn note_counter(&self) -> u32 {
        self.note_counter
    }

    pub(crate) fn set_custom_notes(&mut self, custom: Vec<CustomNote>) {
        self.custom = custom;
    }

    pub(crate) fn set_note_counter(&mut self, note_counter: u32) {
        self.note_counter = note_counter;
    }

    /// Fixed denominations first, then custom ones in the order they were added.
    pub fn denominations(&self) -> Vec<Denomination> {
        let fixed = FIXED_DENOMINATIONS.iter().map(|value| Denomination {
            id: Self::fixed_id(*value),
            value: Decimal::from(*value),
            is_custom: false,
        });
        let custom = self.custom.iter().map(|note| Denomination {
            id: note.id.clone(),
            value: note.value,
            is_custom: true,
        });
        fixed.chain(custom).collect()
    }

    pub fn contains_value(&self, value: Decimal) -> bool {
        FIXED_DENOMINATIONS.iter().any(|v| Decimal::from(*v) == value)
            || self.custom.iter().any(|note| note.value == value)
    }

    /// Registers a new denomination and returns it with its display column.
    ///
    /// # Errors
    ///
    /// Fails if the value is not positive or is already registered.
    pub fn add_denomination(&mut self, value: Decimal) -> Result<(CustomNote, Column)> {
        if value <= Decimal::ZERO {
            tracing::debug!(%value, "rejected non-positive denomination");
            return Err(CalcError::invalid("denomination", "must be greater than zero"));
        }
        if self.contains_value(value) {
            tracing::debug!(%value, "rejected duplicate denomination");
            return Err(CalcError::DuplicateDenomination(value.normalize()));
        }

        // Imported settings may carry a counter lower than existing ids.
        let mut next = self.note_counter;
        let id = loop {
            next = next
                .checked_add(1)
                .ok_or_else(|| CalcError::invalid("denomination", "no more ids available"))?;
            let candidate = format!("customNote{next}");
            if !self.custom.iter().any(|note| note.id == candidate) {
                break candidate;
            }
        };
        self.note_counter = next;

        let note = CustomNote {
            id,
            value: value.normalize(),
        };
        self.custom.push(note.clone());
        tracing::info!(id = %note.id, value = %note.value, "custom denomination added");

        Ok((note, Column::for_ordinal(self.note_counter as usize)))
    }

    /// Removes a custom denomination by id.
    ///
    /// # Errors
    ///
    /// Built-in notes cannot be removed; unknown ids are reported.
    pub fn remove_denomination(&mut self, id: &str) -> Result<CustomNote> {
        if FIXED_DENOMINATIONS.iter().any(|v| Self::fixed_id(*v) == id) {
            return Err(CalcError::FixedDenomination(id.to_string()));
        }
        let position = self
            .custom
            .iter()
            .position(|note| note.id == id)
            .ok_or_else(|| CalcError::UnknownDenomination(id.to_string()))?;

        let removed = self.custom.remove(position);
        tracing::info!(id = %removed.id, value = %removed.value, "custom denomination removed");
        Ok(removed)
    }

    /// Custom notes with the column they are laid out in after a restore.
    pub fn layout(&self) -> Vec<(&CustomNote, Column)> {
        self.custom
            .iter()
            .enumerate()
            .map(|(index, note)| (note, Column::for_ordinal(index + 1)))
            .collect()
    }

    /// Tallies counts keyed by denomination id. Ids not present count as zero.
    pub fn tally_counts(&self, counts: &HashMap<String, i64>) -> Result<Tally> {
        let denominations = self.denominations();
        tally(
            denominations
                .iter()
                .map(|d| (d, counts.get(&d.id).copied())),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn counts(pairs: &[(&str, i64)]) -> HashMap<String, i64> {
        pairs.iter().map(|(id, c)| (id.to_string(), *c)).collect()
    }

    #[test]
    fn test_tally_fixed_notes() {
        let counter = NoteCounter::new();
        let tally = counter
            .tally_counts(&counts(&[("note1000", 5), ("note50", 3), ("note10", 0)]))
            .unwrap();

        assert_eq!(tally.grand_total, dec!(5150));
        assert_eq!(tally.lines.len(), FIXED_DENOMINATIONS.len());
        assert_eq!(
            tally.breakdown(),
            vec!["5 × ৳1000 = ৳5,000".to_string(), "3 × ৳50 = ৳150".to_string()]
        );
    }

    #[test]
    fn test_tally_is_linear() {
        let mut counter = NoteCounter::new();
        counter.add_denomination(dec!(2000)).unwrap();
        let single = counts(&[("note500", 7), ("note20", 11), ("customNote1", 2)]);
        let doubled: HashMap<String, i64> = single.iter().map(|(k, v)| (k.clone(), v * 2)).collect();

        let a = counter.tally_counts(&single).unwrap();
        let b = counter.tally_counts(&doubled).unwrap();

        assert_eq!(b.grand_total, a.grand_total * dec!(2));
        for (x, y) in a.lines.iter().zip(b.lines.iter()) {
            assert_eq!(y.subtotal, x.subtotal * dec!(2));
        }
    }

    #[test]
    fn test_negative_counts_are_zero() {
        let counter = NoteCounter::new();
        let tally = counter.tally_counts(&counts(&[("note100", -4), ("note200", 2)])).unwrap();
        assert_eq!(tally.grand_total, dec!(400));
        assert_eq!(tally.breakdown().len(), 1);
    }

    #[test]
    fn test_oversized_tally_is_rejected() {
        let mut counter = NoteCounter::new();
        counter.add_denomination(dec!(100000000000000000000)).unwrap();

        let err = counter
            .tally_counts(&counts(&[("customNote1", 9_000_000_000_000_000_000)]))
            .unwrap_err();
        assert!(matches!(err, CalcError::InvalidInput { field: "note_count", .. }));

        let mut counter = NoteCounter::new();
        counter.add_denomination(dec!(50000000000000000000000000000)).unwrap();
        counter.add_denomination(dec!(40000000000000000000000000000)).unwrap();
        let per_note = counts(&[("customNote1", 1), ("customNote2", 1)]);
        assert!(counter.tally_counts(&per_note).is_err());
    }

    #[test]
    fn test_exhausted_counter_is_an_error() {
        let mut counter = NoteCounter::restore(Vec::new(), u32::MAX);
        assert!(counter.add_denomination(dec!(5)).is_err());
        assert_eq!(counter.note_counter(), u32::MAX);
        assert!(counter.custom_notes().is_empty());
    }

    #[test]
    fn test_custom_notes_follow_fixed_ones() {
        let mut counter = NoteCounter::new();
        let (first, col1) = counter.add_denomination(dec!(2000)).unwrap();
        let (second, col2) = counter.add_denomination(dec!(25)).unwrap();

        assert_eq!(first.id, "customNote1");
        assert_eq!(second.id, "customNote2");
        assert_eq!(col1, Column::First);
        assert_eq!(col2, Column::Second);

        let tally = counter
            .tally_counts(&counts(&[("customNote2", 4), ("note10", 1)]))
            .unwrap();
        assert_eq!(tally.grand_total, dec!(110));
        assert_eq!(
            tally.breakdown(),
            vec!["1 × ৳10 = ৳10".to_string(), "4 × ৳25 = ৳100".to_string()]
        );
    }

    #[test]
    fn test_duplicate_denominations_rejected() {
        let mut counter = NoteCounter::new();
        assert!(matches!(
            counter.add_denomination(dec!(500)),
            Err(CalcError::DuplicateDenomination(_))
        ));
        counter.add_denomination(dec!(2000)).unwrap();
        assert!(matches!(
            counter.add_denomination(dec!(2000.00)),
            Err(CalcError::DuplicateDenomination(_))
        ));
        assert_eq!(counter.custom_notes().len(), 1);
        assert!(counter.add_denomination(dec!(0)).is_err());
    }

    #[test]
    fn test_remove_denomination() {
        let mut counter = NoteCounter::new();
        counter.add_denomination(dec!(2000)).unwrap();
        counter.add_denomination(dec!(5)).unwrap();

        let removed = counter.remove_denomination("customNote1").unwrap();
        assert_eq!(removed.value, dec!(2000));
        assert!(!counter.contains_value(dec!(2000)));

        assert!(matches!(
            counter.remove_denomination("note1000"),
            Err(CalcError::FixedDenomination(_))
        ));
        assert!(matches!(
            counter.remove_denomination("customNote1"),
            Err(CalcError::UnknownDenomination(_))
        ));

        // Ids are never handed out twice.
        let (next, _) = counter.add_denomination(dec!(2000)).unwrap();
        assert_eq!(next.id, "customNote3");
    }

    #[test]
    fn test_restored_counter_skips_taken_ids() {
        let mut counter = NoteCounter::restore(
            vec![CustomNote {
                id: "customNote1".into(),
                value: dec!(2000),
            }],
            0,
        );
        let (note, _) = counter.add_denomination(dec!(5)).unwrap();
        assert_eq!(note.id, "customNote2");
        assert_eq!(counter.note_counter(), 2);
    }

    #[test]
    fn test_layout_alternates_by_position() {
        let counter = NoteCounter::restore(
            vec![
                CustomNote { id: "customNote4".into(), value: dec!(2000) },
                CustomNote { id: "customNote7".into(), value: dec!(5) },
                CustomNote { id: "customNote9".into(), value: dec!(2) },
            ],
            9,
        );
        let columns: Vec<Column> = counter.layout().into_iter().map(|(_, c)| c).collect();
        assert_eq!(columns, vec![Column::First, Column::Second, Column::First]);
    }
}
