//! End-to-end scenarios across zones, DST transitions and date lines.

use chrono::{DateTime, NaiveDate, Utc};

use merchant_tz::core::{RawRecord, RecordStatus, Tenant, TenantId};
use merchant_tz::services::{
    analyze_date, tenant_map, AggregationOptions, BusinessWindowPolicy, DateRelation, Dimension,
    DimensionValue, Engine, PolicyBook,
};
use merchant_tz::time::{parse_local_date, parse_utc_instant, TimezoneRegistry};
use merchant_tz::EngineConfig;
use std::sync::Arc;

fn utc(s: &str) -> DateTime<Utc> {
    parse_utc_instant(s).unwrap()
}

fn paid(id: i64, tenant: i64, amount: f64, when: DateTime<Utc>) -> RawRecord {
    RawRecord {
        id,
        order_number: format!("ORD-{}", id),
        tenant_id: TenantId(tenant),
        amount,
        currency: "USD".to_string(),
        status: RecordStatus::Paid,
        order_time_utc: when,
        completed_time_utc: None,
    }
}

#[test]
fn test_sp_merchant_late_order_counts_on_local_monday() {
    let engine = Engine::default();
    let tenants = tenant_map(vec![Tenant::new(1, "SP-Merchant", "America/Sao_Paulo")]);
    let projected = engine
        .project(&[paid(1, 1, 75.0, utc("2024-08-20T02:00:00Z"))], &tenants)
        .unwrap();

    let by_date = engine.aggregate(&projected, &[Dimension::LocalDate]);
    assert_eq!(by_date.groups.len(), 1);
    assert_eq!(
        by_date.groups[0].key,
        vec![DimensionValue::LocalDate(parse_local_date("2024-08-19").unwrap())]
    );
    assert_eq!(projected[0].order.local.local_weekday, "Monday");
    assert!(!projected[0].is_business_hour());
}

#[test]
fn test_same_instant_lands_on_different_local_dates() {
    let engine = Engine::default();
    let tenants = tenant_map(vec![
        Tenant::new(1, "Kiritimati", "Pacific/Kiritimati"),
        Tenant::new(2, "London", "Europe/London"),
        Tenant::new(3, "Honolulu", "Pacific/Honolulu"),
    ]);
    let instant = utc("2024-08-19T09:30:00Z");
    let records: Vec<RawRecord> = (1..=3).map(|t| paid(t, t, 10.0, instant)).collect();
    let projected = engine.project(&records, &tenants).unwrap();

    let dates: Vec<String> = projected.iter().map(|p| p.local_date().to_string()).collect();
    assert_eq!(dates, vec!["2024-08-19", "2024-08-19", "2024-08-18"]);

    // +14 at 09:30Z is 23:30 the same day
    let late = utc("2024-08-19T10:30:00Z");
    let kiritimati = engine
        .project(&[paid(9, 1, 10.0, late)], &tenants)
        .unwrap();
    assert_eq!(kiritimati[0].local_date().to_string(), "2024-08-20");
}

#[test]
fn test_new_york_spring_forward_offsets() {
    let engine = Engine::default();
    let tenants = tenant_map(vec![Tenant::new(1, "NY-Deli", "America/New_York")]);
    let projected = engine
        .project(
            &[
                paid(1, 1, 1.0, utc("2024-03-10T06:30:00Z")),
                paid(2, 1, 1.0, utc("2024-03-10T07:30:00Z")),
            ],
            &tenants,
        )
        .unwrap();

    assert_eq!(projected[0].order.local.utc_offset_seconds, -5 * 3600);
    assert_eq!(projected[0].local_hour(), 1);
    assert_eq!(projected[1].order.local.utc_offset_seconds, -4 * 3600);
    assert_eq!(projected[1].local_hour(), 3);
}

#[test]
fn test_fall_back_repeated_hour_keeps_both_orders() {
    let engine = Engine::default();
    let tenants = tenant_map(vec![Tenant::new(1, "NY-Deli", "America/New_York")]);
    // 01:30 EDT and 01:30 EST on 2024-11-03
    let projected = engine
        .project(
            &[
                paid(1, 1, 10.0, utc("2024-11-03T05:30:00Z")),
                paid(2, 1, 20.0, utc("2024-11-03T06:30:00Z")),
            ],
            &tenants,
        )
        .unwrap();
    assert_eq!(projected[0].local_hour(), 1);
    assert_eq!(projected[1].local_hour(), 1);

    let by_hour = engine.aggregate(&projected, &[Dimension::LocalHour]);
    assert_eq!(by_hour.groups.len(), 1);
    assert_eq!(by_hour.groups[0].count, 2);
    assert_eq!(by_hour.groups[0].total_amount, 30.0);
}

#[test]
fn test_comparison_at_demo_instant() {
    let engine = Engine::default();
    let tenants = vec![
        Tenant::new(1, "Tokyo-Shop", "Asia/Tokyo"),
        Tenant::new(2, "SP-Merchant", "America/Sao_Paulo"),
        Tenant::new(3, "Tonga", "Pacific/Tongatapu"),
    ];
    let comparison = engine.compare(engine.demo_instant(), &tenants).unwrap();

    let relations: Vec<DateRelation> = comparison
        .comparisons
        .iter()
        .map(|c| c.date_relation)
        .collect();
    assert_eq!(
        relations,
        vec![DateRelation::SameDay, DateRelation::PrevDay, DateRelation::SameDay]
    );
    assert_eq!(comparison.comparisons[2].hour_difference_from_utc, -11);
    assert_eq!(comparison.comparisons[2].time_difference, "-11h");
}

#[test]
fn test_tenant_policy_override_from_config() {
    let config = EngineConfig::from_str(
        r#"
        [[tenant_policies]]
        tenant_id = 2
        weekend_days = [5, 6]
        business_days = [0, 1, 2, 3, 4]
        "#,
    )
    .unwrap();
    let engine = config.build_engine().unwrap();
    let tenants = tenant_map(vec![
        Tenant::new(1, "Paris", "Europe/Paris"),
        Tenant::new(2, "Dubai", "Asia/Dubai"),
    ]);

    // 2024-08-16 is a Friday
    let projected = engine
        .project(
            &[
                paid(1, 1, 1.0, utc("2024-08-16T09:00:00Z")),
                paid(2, 2, 1.0, utc("2024-08-16T09:00:00Z")),
            ],
            &tenants,
        )
        .unwrap();
    assert!(!projected[0].is_weekend());
    assert!(projected[0].is_business_hour());
    assert!(projected[1].is_weekend());
    assert!(!projected[1].is_business_hour());
}

#[test]
fn test_custom_registry_and_policy_book() {
    let policies = PolicyBook::new(BusinessWindowPolicy::new([0, 6], 1..=5, 0, 23).unwrap()).unwrap();
    let engine = Engine::new(Arc::new(TimezoneRegistry::new()), policies);
    let tenants = tenant_map(vec![Tenant::new(1, "Night-Owl", "UTC")]);
    let projected = engine
        .project(&[paid(1, 1, 1.0, utc("2024-08-19T03:00:00Z"))], &tenants)
        .unwrap();
    assert!(projected[0].is_business_hour());
}

#[test]
fn test_daily_analysis_spans_more_than_one_utc_day() {
    let engine = Engine::default();
    let tenants = tenant_map(vec![
        Tenant::new(1, "Auckland", "Pacific/Auckland"),
        Tenant::new(2, "Honolulu", "Pacific/Honolulu"),
    ]);
    // local 2024-08-19 00:30 in Auckland and 23:30 in Honolulu
    let projected = engine
        .project(
            &[
                paid(1, 1, 10.0, utc("2024-08-18T12:30:00Z")),
                paid(2, 2, 20.0, utc("2024-08-20T09:30:00Z")),
            ],
            &tenants,
        )
        .unwrap();

    let date = NaiveDate::from_ymd_opt(2024, 8, 19).unwrap();
    let report = analyze_date(&projected, date, &AggregationOptions::completed_orders(), 10);
    assert_eq!(report.total_orders, 2);
    let hours: Vec<u32> = report.hourly_breakdown.iter().map(|h| h.hour).collect();
    assert_eq!(hours, vec![0, 23]);
}
