use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use criterion::{Criterion, criterion_group, criterion_main};
use rust_decimal::Decimal;
use sales_dashboard::{
    aggregate::{self, DateRange},
    merge::{MergedSalesTable, SalesRow},
};

const STORE_TYPES: [&str; 4] = ["e-Shop", "MBR", "TeleShop", "Flagship store"];
const SUBCATEGORIES: [&str; 4] = ["Mens", "Women", "Kids", "Mobiles"];

fn generate_table(rows: usize) -> MergedSalesTable {
    let first = NaiveDate::from_ymd_opt(2011, 1, 25).expect("start date");
    (0..rows)
        .map(|i| {
            let date = first + Duration::days((i % 1100) as i64);
            let amount = if i % 10 == 0 {
                format!("-{}.25", i % 500)
            } else {
                format!("{}.75", i % 5000)
            };
            SalesRow {
                transaction_id: i.to_string(),
                customer_id: (i % 5000).to_string(),
                product_category_code: (i % 6).to_string(),
                product_subcategory_code: (i % 4).to_string(),
                store_type: STORE_TYPES[i % STORE_TYPES.len()].to_string(),
                transaction_date: date,
                day_of_week: date.weekday(),
                quantity: Some((i % 5) as i64 + 1),
                total_amount: Decimal::from_str(&amount).expect("amount"),
                category: Some(format!("Category {}", i % 6)),
                subcategory: Some(SUBCATEGORIES[i % SUBCATEGORIES.len()].to_string()),
                gender: Some(if i % 2 == 0 { "F" } else { "M" }.to_string()),
                country: Some(format!("Country {}", i % 12)),
            }
        })
        .collect()
}

fn bench_aggregations(c: &mut Criterion) {
    let table = generate_table(50_000);
    let range = aggregate::date_bounds(&table).expect("non-empty table");
    let narrow = DateRange::new(
        NaiveDate::from_ymd_opt(2012, 1, 1).expect("date"),
        NaiveDate::from_ymd_opt(2012, 6, 30).expect("date"),
    );

    let mut group = c.benchmark_group("aggregate_50k");
    group.sample_size(20);
    group.bench_function("period_and_channel_full_range", |b| {
        b.iter(|| aggregate::revenue_by_period_and_channel(&table, range))
    });
    group.bench_function("country_half_year", |b| {
        b.iter(|| aggregate::revenue_by_country(&table, narrow))
    });
    group.bench_function("subcategory_gender_pivot", |b| {
        b.iter(|| aggregate::revenue_by_subcategory_and_gender(&table, "Category 3"))
    });
    group.bench_function("day_of_week", |b| {
        b.iter(|| aggregate::revenue_by_day_of_week(&table, "MBR"))
    });
    group.finish();
}

criterion_group!(benches, bench_aggregations);
criterion_main!(benches);
