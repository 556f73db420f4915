//! Chart-ready aggregations over the merged sales table.
//!
//! Every function is a pure read of [`MergedSalesTable`]. Only sales count
//! toward revenue: rows with a zero or negative amount (returns, refunds)
//! are skipped everywhere. Unknown filter values produce empty or zero
//! results rather than errors.

use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDate, Weekday};
use itertools::{Itertools, MinMaxResult};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::{
    dates::{Month, WEEK, weekday_name},
    merge::{MergedSalesTable, SalesRow},
};

pub const FEMALE: &str = "F";
pub const MALE: &str = "M";

/// Inclusive date range. A range whose start is after its end matches nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start > self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Monthly revenue per channel, channels and months in ascending order.
pub type ChannelSeries = BTreeMap<String, Vec<(Month, Decimal)>>;

/// Revenue per country name.
pub type CountrySeries = BTreeMap<String, Decimal>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubcategoryRevenue {
    pub subcategory: String,
    pub female: Decimal,
    pub male: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeekdayRevenue {
    #[serde(serialize_with = "serialize_weekday")]
    pub day: Weekday,
    pub amount: Decimal,
}

fn serialize_weekday<S: serde::Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(weekday_name(*day))
}

fn sales_in<'a>(
    table: &'a MergedSalesTable,
    range: DateRange,
) -> impl Iterator<Item = &'a SalesRow> + 'a {
    table
        .iter()
        .filter(move |row| row.is_sale() && range.contains(row.transaction_date))
}

/// Adds `amount`, saturating at the `Decimal` bounds.
fn accumulate(sum: &mut Decimal, amount: Decimal) {
    *sum = sum.saturating_add(amount);
}

fn round_money(value: Decimal) -> Decimal {
    value.round_dp(2)
}

pub fn revenue_by_period_and_channel(table: &MergedSalesTable, range: DateRange) -> ChannelSeries {
    let mut sums: BTreeMap<(String, Month), Decimal> = BTreeMap::new();
    for row in sales_in(table, range) {
        accumulate(
            sums.entry((row.store_type.clone(), Month::of(row.transaction_date)))
                .or_default(),
            row.total_amount,
        );
    }

    let mut series = ChannelSeries::new();
    for ((channel, month), amount) in sums {
        series
            .entry(channel)
            .or_default()
            .push((month, round_money(amount)));
    }
    series
}

pub fn revenue_by_country(table: &MergedSalesTable, range: DateRange) -> CountrySeries {
    let mut sums = CountrySeries::new();
    for row in sales_in(table, range) {
        if let Some(country) = &row.country {
            accumulate(sums.entry(country.clone()).or_default(), row.total_amount);
        }
    }
    sums.into_iter()
        .map(|(country, amount)| (country, round_money(amount)))
        .collect()
}

/// Female/male revenue per subcategory of `category`, ascending by combined
/// total. Ties keep subcategory name order.
pub fn revenue_by_subcategory_and_gender(
    table: &MergedSalesTable,
    category: &str,
) -> Vec<SubcategoryRevenue> {
    let mut pivot: BTreeMap<&str, (Decimal, Decimal)> = BTreeMap::new();
    let matching = table
        .iter()
        .filter(|row| row.is_sale() && row.category.as_deref() == Some(category));
    for row in matching {
        let (Some(subcategory), Some(gender)) = (row.subcategory.as_deref(), row.gender.as_deref())
        else {
            continue;
        };
        match gender {
            FEMALE => accumulate(&mut pivot.entry(subcategory).or_default().0, row.total_amount),
            MALE => accumulate(&mut pivot.entry(subcategory).or_default().1, row.total_amount),
            _ => {}
        }
    }

    // A side with no sales counts as zero, so one-gender subcategories sort
    // by that side's revenue instead of falling to the end.
    pivot
        .into_iter()
        .map(|(subcategory, (female, male))| {
            (subcategory, female, male, female.saturating_add(male))
        })
        .sorted_by(|a, b| a.3.cmp(&b.3))
        .map(|(subcategory, female, male, total)| SubcategoryRevenue {
            subcategory: subcategory.to_string(),
            female: round_money(female),
            male: round_money(male),
            total: round_money(total),
        })
        .collect()
}

/// Revenue for `store_type` on each weekday, Monday first, zero-filled.
pub fn revenue_by_day_of_week(table: &MergedSalesTable, store_type: &str) -> [WeekdayRevenue; 7] {
    let mut sums: HashMap<Weekday, Decimal> = HashMap::with_capacity(7);
    for row in table
        .iter()
        .filter(|row| row.is_sale() && row.store_type == store_type)
    {
        accumulate(sums.entry(row.day_of_week).or_default(), row.total_amount);
    }
    WEEK.map(|day| WeekdayRevenue {
        day,
        amount: sums.get(&day).copied().unwrap_or_default(),
    })
}

/// Distinct store types in first-seen order.
pub fn store_types(table: &MergedSalesTable) -> Vec<String> {
    table
        .iter()
        .map(|row| row.store_type.as_str())
        .unique()
        .map(str::to_string)
        .collect()
}

/// Distinct category names in first-seen order; unmatched codes are left out.
pub fn categories(table: &MergedSalesTable) -> Vec<String> {
    table
        .iter()
        .filter_map(|row| row.category.as_deref())
        .unique()
        .map(str::to_string)
        .collect()
}

/// Earliest and latest transaction date, `None` for an empty table.
pub fn date_bounds(table: &MergedSalesTable) -> Option<DateRange> {
    match table.iter().map(|row| row.transaction_date).minmax() {
        MinMaxResult::NoElements => None,
        MinMaxResult::OneElement(day) => Some(DateRange::new(day, day)),
        MinMaxResult::MinMax(start, end) => Some(DateRange::new(start, end)),
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use chrono::Datelike;

    use super::*;

    fn row(day: &str, store: &str, amount: &str) -> SalesRow {
        let date = NaiveDate::from_str(day).unwrap();
        SalesRow {
            transaction_id: format!("{day}-{store}-{amount}"),
            customer_id: "1".to_string(),
            product_category_code: "1".to_string(),
            product_subcategory_code: "1".to_string(),
            store_type: store.to_string(),
            transaction_date: date,
            day_of_week: date.weekday(),
            quantity: None,
            total_amount: Decimal::from_str(amount).unwrap(),
            category: Some("Books".to_string()),
            subcategory: Some("Fiction".to_string()),
            gender: Some("F".to_string()),
            country: Some("Australia".to_string()),
        }
    }

    #[test]
    fn monthly_series_round_half_even() {
        let table: MergedSalesTable = vec![
            row("2013-01-05", "MBR", "10.005"),
            row("2013-01-31", "MBR", "0.010"),
        ]
        .into_iter()
        .collect();
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2013, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2013, 12, 31).unwrap(),
        );
        let series = revenue_by_period_and_channel(&table, range);
        assert_eq!(
            series["MBR"],
            vec![(Month { year: 2013, month: 1 }, Decimal::from_str("10.02").unwrap())]
        );
    }

    #[test]
    fn sums_past_the_decimal_range_saturate() {
        let huge = "50000000000000000000000000000";
        let table: MergedSalesTable = vec![
            row("2013-01-05", "MBR", huge),
            row("2013-01-05", "MBR", huge),
        ]
        .into_iter()
        .collect();
        let range = date_bounds(&table).expect("bounds");
        assert_eq!(revenue_by_country(&table, range)["Australia"], Decimal::MAX);
        assert_eq!(
            revenue_by_period_and_channel(&table, range)["MBR"][0].1,
            Decimal::MAX
        );
        assert_eq!(revenue_by_day_of_week(&table, "MBR")[5].amount, Decimal::MAX);
        assert_eq!(
            revenue_by_subcategory_and_gender(&table, "Books")[0].total,
            Decimal::MAX
        );
    }

    #[test]
    fn one_gender_subcategory_sorts_by_its_own_side() {
        let mut male_only = row("2013-01-05", "MBR", "50");
        male_only.subcategory = Some("Atlases".to_string());
        male_only.gender = Some("M".to_string());
        let table: MergedSalesTable = vec![row("2013-01-05", "MBR", "80"), male_only]
            .into_iter()
            .collect();
        let pivot = revenue_by_subcategory_and_gender(&table, "Books");
        assert_eq!(pivot[0].subcategory, "Atlases");
        assert_eq!(pivot[0].female, Decimal::ZERO);
        assert_eq!(pivot[0].total, Decimal::from(50));
        assert_eq!(pivot[1].subcategory, "Fiction");
    }

    #[test]
    fn bounds_cover_single_row_tables() {
        let table: MergedSalesTable = vec![row("2012-06-01", "MBR", "1")].into_iter().collect();
        let bounds = date_bounds(&table).expect("bounds");
        assert_eq!(bounds.start, bounds.end);
        assert!(date_bounds(&MergedSalesTable::default()).is_none());
    }
}
