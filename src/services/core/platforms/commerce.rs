// Storefront adapters (Shopify, WooCommerce)

use super::{num_field, count_field, FetchError, FetchRequest, PlatformAdapter, PlatformFunctionClient};
use crate::types::{CommerceMetrics, NormalizedMetrics, PlatformId};
use async_trait::async_trait;

fn average_order_value(revenue: f64, orders: u64) -> f64 {
    if orders > 0 {
        revenue / orders as f64
    } else {
        0.0
    }
}

pub struct ShopifyAdapter {
    client: PlatformFunctionClient,
}

impl ShopifyAdapter {
    pub fn new(client: PlatformFunctionClient) -> Self {
        Self { client }
    }

    pub fn parse_payload(payload: &serde_json::Value) -> Result<CommerceMetrics, String> {
        let revenue =
            num_field(payload, &["total_sales", "revenue"]).ok_or("missing total_sales")?;
        let orders = count_field(payload, &["orders_count", "orders"]).unwrap_or(0);

        Ok(CommerceMetrics {
            revenue,
            orders,
            average_order_value: num_field(payload, &["average_order_value"])
                .unwrap_or_else(|| average_order_value(revenue, orders)),
            customers: count_field(payload, &["customers_count", "customers"]).unwrap_or(0),
        })
    }
}

#[async_trait(?Send)]
impl PlatformAdapter for ShopifyAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::Shopify
    }

    async fn fetch_metrics(
        &self,
        request: &FetchRequest,
    ) -> Result<NormalizedMetrics, FetchError> {
        let payload = self.client.invoke(self.platform(), request).await?;
        let metrics = Self::parse_payload(&payload).map_err(|message| FetchError::Malformed {
            platform: self.platform(),
            message: message.to_string(),
        })?;
        Ok(NormalizedMetrics::Commerce(metrics))
    }
}

pub struct WooCommerceAdapter {
    client: PlatformFunctionClient,
}

impl WooCommerceAdapter {
    pub fn new(client: PlatformFunctionClient) -> Self {
        Self { client }
    }

    pub fn parse_payload(payload: &serde_json::Value) -> Result<CommerceMetrics, String> {
        let revenue =
            num_field(payload, &["total_sales", "net_revenue"]).ok_or("missing total_sales")?;
        let orders = count_field(payload, &["total_orders", "orders"]).unwrap_or(0);

        Ok(CommerceMetrics {
            revenue,
            orders,
            average_order_value: num_field(payload, &["average_sales", "average_order_value"])
                .unwrap_or_else(|| average_order_value(revenue, orders)),
            customers: count_field(payload, &["total_customers", "customers"]).unwrap_or(0),
        })
    }
}

#[async_trait(?Send)]
impl PlatformAdapter for WooCommerceAdapter {
    fn platform(&self) -> PlatformId {
        PlatformId::WooCommerce
    }

    async fn fetch_metrics(
        &self,
        request: &FetchRequest,
    ) -> Result<NormalizedMetrics, FetchError> {
        let payload = self.client.invoke(self.platform(), request).await?;
        let metrics = Self::parse_payload(&payload).map_err(|message| FetchError::Malformed {
            platform: self.platform(),
            message: message.to_string(),
        })?;
        Ok(NormalizedMetrics::Commerce(metrics))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_order_value_guard() {
        assert_eq!(average_order_value(500.0, 0), 0.0);
        assert_eq!(average_order_value(500.0, 10), 50.0);
    }
}
