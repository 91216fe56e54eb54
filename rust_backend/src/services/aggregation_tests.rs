#[cfg(test)]
mod tests {
    use crate::core::domain::{RawRecord, RecordStatus, Tenant, TenantId};
    use crate::services::aggregation::{
        aggregate, analyze_date, top_n, AggregationOptions, Dimension, DimensionValue, TimeAnchor,
    };
    use crate::services::classifier::{DayType, PolicyBook};
    use crate::services::projection::{tenant_map, ProjectedRecord, ProjectionService};
    use crate::time::TimezoneRegistry;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    fn at(d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 8, d, h, 0, 0).unwrap()
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 8, d).unwrap()
    }

    fn record(id: i64, tenant: i64, amount: f64, status: RecordStatus, when: DateTime<Utc>) -> RawRecord {
        RawRecord {
            id,
            order_number: format!("ORD-{}", id),
            tenant_id: TenantId(tenant),
            amount,
            currency: "USD".to_string(),
            status,
            order_time_utc: when,
            completed_time_utc: None,
        }
    }

    fn project(records: &[RawRecord]) -> Vec<ProjectedRecord> {
        let registry = TimezoneRegistry::new();
        let policies = PolicyBook::default();
        let tenants = tenant_map(vec![
            Tenant::new(1, "SP-Merchant", "America/Sao_Paulo").with_location("Brazil", "São Paulo"),
            Tenant::new(2, "Tokyo-Shop", "Asia/Tokyo").with_location("Japan", "Tokyo"),
            Tenant::new(3, "London-Goods", "Europe/London").with_location("UK", "London"),
        ]);
        ProjectionService::new(&registry, &policies)
            .project_all(records, &tenants)
            .unwrap()
    }

    fn sample() -> Vec<ProjectedRecord> {
        use RecordStatus::*;
        project(&[
            // 2024-08-19 23:00 in São Paulo
            record(1, 1, 100.0, Paid, at(20, 2)),
            // 2024-08-19 10:00 in São Paulo
            record(2, 1, 50.0, Delivered, at(19, 13)),
            // 2024-08-19 18:00 in Tokyo
            record(3, 2, 80.0, Shipped, at(19, 9)),
            // 2024-08-20 09:00 in Tokyo
            record(4, 2, 40.0, Paid, at(20, 0)),
            // cancelled, excluded under the completed set
            record(5, 3, 999.0, Cancelled, at(19, 12)),
            // 2024-08-17 (Saturday) 12:00 in London
            record(6, 3, 30.0, Paid, at(17, 11)),
        ])
    }

    #[test]
    fn test_empty_input_yields_empty_result() {
        let result = aggregate(&[], &[Dimension::LocalDate], &AggregationOptions::completed_orders());
        assert!(result.is_empty());
        assert_eq!(result.total_count(), 0);
        assert_eq!(result.total_amount(), 0.0);
    }

    #[test]
    fn test_group_sums_equal_ungrouped_sum() {
        let records = sample();
        let options = AggregationOptions::completed_orders();
        let overall = aggregate(&records, &[], &options);
        assert_eq!(overall.groups.len(), 1);
        assert_eq!(overall.total_count(), 5);
        assert_eq!(overall.total_amount(), 300.0);

        for dims in [
            vec![Dimension::TenantId],
            vec![Dimension::Timezone],
            vec![Dimension::LocalDate, Dimension::LocalHour],
            vec![Dimension::DayType],
        ] {
            let grouped = aggregate(&records, &dims, &options);
            assert_eq!(grouped.total_count(), overall.total_count());
            assert!((grouped.total_amount() - overall.total_amount()).abs() < 1e-9);
        }
    }

    #[test]
    fn test_grouping_by_local_date_uses_tenant_calendar() {
        let result = aggregate(
            &sample(),
            &[Dimension::LocalDate],
            &AggregationOptions::completed_orders(),
        );
        let keys: Vec<_> = result.groups.iter().map(|g| g.key.clone()).collect();
        assert_eq!(
            keys,
            vec![
                vec![DimensionValue::LocalDate(date(17))],
                vec![DimensionValue::LocalDate(date(19))],
                vec![DimensionValue::LocalDate(date(20))],
            ]
        );
        let aug19 = &result.groups[1];
        assert_eq!(aug19.count, 3);
        assert_eq!(aug19.total_amount, 230.0);
        assert!((aug19.avg_amount - 230.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_status_filter_is_explicit() {
        let records = sample();
        let everything = AggregationOptions::new(RecordStatus::ALL);
        assert_eq!(aggregate(&records, &[], &everything).total_count(), 6);

        let cancelled_only = AggregationOptions::new([RecordStatus::Cancelled]);
        let result = aggregate(&records, &[Dimension::TenantId], &cancelled_only);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].key, vec![DimensionValue::TenantId(TenantId(3))]);
        assert_eq!(result.groups[0].total_amount, 999.0);

        let none = AggregationOptions::new(Vec::<RecordStatus>::new());
        assert!(aggregate(&records, &[], &none).is_empty());
    }

    #[test]
    fn test_day_type_dimension() {
        let result = aggregate(
            &sample(),
            &[Dimension::DayType],
            &AggregationOptions::completed_orders(),
        );
        assert_eq!(result.groups.len(), 2);
        assert_eq!(result.groups[0].key, vec![DimensionValue::DayType(DayType::Weekday)]);
        assert_eq!(result.groups[0].count, 4);
        assert_eq!(result.groups[1].key, vec![DimensionValue::DayType(DayType::Weekend)]);
        assert_eq!(result.groups[1].total_amount, 30.0);
    }

    #[test]
    fn test_duplicate_dimensions_collapse() {
        let result = aggregate(
            &sample(),
            &[Dimension::TenantId, Dimension::TenantId],
            &AggregationOptions::completed_orders(),
        );
        assert_eq!(result.dimensions, vec![Dimension::TenantId]);
        assert!(result.groups.iter().all(|g| g.key.len() == 1));
    }

    #[test]
    fn test_completion_anchor_skips_unfinished_records_for_local_dimensions() {
        let mut raw = vec![
            record(1, 2, 10.0, RecordStatus::Paid, at(19, 14)),
            record(2, 2, 20.0, RecordStatus::Paid, at(19, 1)),
        ];
        // ordered 23:00 Tokyo on the 19th, completed 00:00 Tokyo on the 20th
        raw[0].completed_time_utc = Some(at(19, 15));
        let records = project(&raw);
        let options = AggregationOptions::completed_orders().with_anchor(TimeAnchor::Completion);

        let by_date = aggregate(&records, &[Dimension::LocalDate], &options);
        assert_eq!(by_date.groups.len(), 1);
        assert_eq!(by_date.groups[0].key, vec![DimensionValue::LocalDate(date(20))]);
        assert_eq!(by_date.groups[0].count, 1);

        let by_tenant = aggregate(&records, &[Dimension::TenantId], &options);
        assert_eq!(by_tenant.total_count(), 2);
    }

    #[test]
    fn test_top_n_orders_by_total_then_tenant_id() {
        use RecordStatus::Paid;
        let records = project(&[
            record(1, 3, 70.0, Paid, at(19, 12)),
            record(2, 1, 70.0, Paid, at(19, 12)),
            record(3, 2, 100.0, Paid, at(19, 12)),
        ]);
        let ranking = top_n(&records, 10, &AggregationOptions::completed_orders());
        let ids: Vec<i64> = ranking.iter().map(|r| r.merchant_id.value()).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(ranking[0].merchant_name, "Tokyo-Shop");

        let top_two = top_n(&records, 2, &AggregationOptions::completed_orders());
        assert_eq!(top_two.len(), 2);
        assert!(top_n(&records, 0, &AggregationOptions::completed_orders()).is_empty());
    }

    #[test]
    fn test_analyze_date_report() {
        let report = analyze_date(&sample(), date(19), &AggregationOptions::completed_orders(), 10);

        assert_eq!(report.date, date(19));
        assert_eq!(report.total_orders, 3);
        assert_eq!(report.total_amount, 230.0);

        let hours: Vec<u32> = report.hourly_breakdown.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![10, 18, 23]);

        let zones: Vec<&str> = report
            .timezone_stats
            .iter()
            .map(|s| s.timezone.as_str())
            .collect();
        assert_eq!(zones, vec!["America/Sao_Paulo", "Asia/Tokyo"]);
        assert_eq!(report.timezone_stats[0].country, "Brazil");
        assert_eq!(report.timezone_stats[0].total_amount, 150.0);

        assert_eq!(report.top_merchants.len(), 2);
        assert_eq!(report.top_merchants[0].merchant_id, TenantId(1));
    }

    #[test]
    fn test_analyze_date_with_no_orders() {
        let report = analyze_date(&sample(), date(1), &AggregationOptions::completed_orders(), 10);
        assert_eq!(report.total_orders, 0);
        assert!(report.hourly_breakdown.is_empty());
        assert!(report.timezone_stats.is_empty());
        assert!(report.top_merchants.is_empty());
    }

    #[test]
    fn test_analyze_date_splits_countries_sharing_a_zone() {
        let registry = TimezoneRegistry::new();
        let policies = PolicyBook::default();
        let tenants = tenant_map(vec![
            Tenant::new(1, "Berlin-Books", "Europe/Berlin").with_location("Germany", "Berlin"),
            Tenant::new(2, "Oslo-Outdoor", "Europe/Berlin").with_location("Norway", "Oslo"),
        ]);
        let projected = ProjectionService::new(&registry, &policies)
            .project_all(
                &[
                    record(1, 1, 100.0, RecordStatus::Paid, at(19, 10)),
                    record(2, 2, 5.0, RecordStatus::Paid, at(19, 11)),
                ],
                &tenants,
            )
            .unwrap();

        let report = analyze_date(&projected, date(19), &AggregationOptions::completed_orders(), 10);

        let rows: Vec<(&str, &str, f64)> = report
            .timezone_stats
            .iter()
            .map(|s| (s.timezone.as_str(), s.country.as_str(), s.total_amount))
            .collect();
        assert_eq!(
            rows,
            vec![
                ("Europe/Berlin", "Germany", 100.0),
                ("Europe/Berlin", "Norway", 5.0),
            ]
        );
    }
}
