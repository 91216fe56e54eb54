#[cfg(test)]
mod tests {
    use crate::core::domain::{RawRecord, RecordStatus, Tenant, TenantId};
    use crate::core::error::EngineError;
    use crate::services::classifier::PolicyBook;
    use crate::services::orders::{list_orders, OrderListingOptions, OrderQuery};
    use crate::services::projection::{tenant_map, ProjectedRecord, ProjectionService};
    use crate::time::TimezoneRegistry;
    use chrono::{Duration, TimeZone, Utc};

    fn projected(registry: &TimezoneRegistry) -> Vec<ProjectedRecord> {
        let policies = PolicyBook::default();
        let tenants = tenant_map(vec![
            Tenant::new(1, "Tokyo-Shop", "Asia/Tokyo"),
            Tenant::new(2, "NY-Deli", "America/New_York"),
        ]);
        let base = Utc.with_ymd_and_hms(2024, 8, 19, 0, 0, 0).unwrap();
        let records: Vec<RawRecord> = (1..=30)
            .map(|i| RawRecord {
                id: i,
                order_number: format!("ORD-{}", i),
                tenant_id: TenantId(if i % 3 == 0 { 2 } else { 1 }),
                amount: i as f64,
                currency: "JPY".to_string(),
                status: RecordStatus::Paid,
                order_time_utc: base + Duration::hours(i),
                completed_time_utc: None,
            })
            .collect();
        ProjectionService::new(registry, &policies)
            .project_all(&records, &tenants)
            .unwrap()
    }

    #[test]
    fn test_default_page_is_newest_first() {
        let registry = TimezoneRegistry::new();
        let page = list_orders(
            projected(&registry),
            &OrderQuery::default(),
            &OrderListingOptions::default(),
            &registry,
        )
        .unwrap();

        assert_eq!(page.total, 30);
        assert_eq!(page.limit, 20);
        assert_eq!(page.offset, 0);
        assert_eq!(page.orders.len(), 20);
        assert_eq!(page.orders[0].record.id, 30);
        assert!(page
            .orders
            .windows(2)
            .all(|w| w[0].record.order_time_utc >= w[1].record.order_time_utc));
    }

    #[test]
    fn test_timezone_filter_and_paging() {
        let registry = TimezoneRegistry::new();
        let query = OrderQuery::default().in_timezone("America/New_York").page(4, 2);
        let page = list_orders(
            projected(&registry),
            &query,
            &OrderListingOptions::default(),
            &registry,
        )
        .unwrap();

        assert_eq!(page.total, 10);
        let ids: Vec<i64> = page.orders.iter().map(|o| o.record.id).collect();
        assert_eq!(ids, vec![24, 21, 18, 15]);
    }

    #[test]
    fn test_non_positive_limit_falls_back_and_large_limit_is_clamped() {
        let registry = TimezoneRegistry::new();
        let options = OrderListingOptions {
            default_limit: 5,
            max_limit: 8,
        };

        let zero = list_orders(
            projected(&registry),
            &OrderQuery::default().page(0, -3),
            &options,
            &registry,
        )
        .unwrap();
        assert_eq!(zero.limit, 5);
        assert_eq!(zero.offset, 0);
        assert_eq!(zero.orders.len(), 5);

        let huge = list_orders(
            projected(&registry),
            &OrderQuery::default().page(10_000, 0),
            &options,
            &registry,
        )
        .unwrap();
        assert_eq!(huge.limit, 8);
        assert_eq!(huge.orders.len(), 8);
    }

    #[test]
    fn test_offset_past_end_yields_empty_page() {
        let registry = TimezoneRegistry::new();
        let page = list_orders(
            projected(&registry),
            &OrderQuery::default().page(10, 100),
            &OrderListingOptions::default(),
            &registry,
        )
        .unwrap();
        assert_eq!(page.total, 30);
        assert!(page.orders.is_empty());
    }

    #[test]
    fn test_unknown_timezone_filter_rejected() {
        let registry = TimezoneRegistry::new();
        let err = list_orders(
            projected(&registry),
            &OrderQuery::default().in_timezone("Atlantis/Capital"),
            &OrderListingOptions::default(),
            &registry,
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::InvalidTimezone { .. }));
    }
}
