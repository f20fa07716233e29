//! Demo: a customer posts a cart and a shopper finds and opens it, over a shared
//! in-memory network.

use cart_finder::lifecycle::{setup_tracing, FinderConfig, FinderSystem};
use cart_finder::model::{
    AgentPubKey, CartProduct, CartSignal, DeliveryTimeSlot, OrderPosting, Profile, Seed,
};
use cart_finder::clients::RuntimeProfiles;
use cart_finder::runtime::memory::MemoryNetwork;
use cart_finder::runtime::RuntimeClient;
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info, Instrument};

#[tokio::main]
async fn main() -> Result<(), String> {
    dotenvy::dotenv().ok();
    setup_tracing();

    let config = FinderConfig::from_env_or_default();
    info!(?config, "Starting cart finder demo");

    let network = MemoryNetwork::new();
    let customer_runtime: Arc<dyn RuntimeClient> =
        Arc::new(network.connect(AgentPubKey(vec![0xa1; 32])));
    let shopper_runtime: Arc<dyn RuntimeClient> =
        Arc::new(network.connect(AgentPubKey(vec![0xb2; 32])));

    let customer = FinderSystem::new(config.clone());
    let shopper = FinderSystem::new(config);
    customer
        .set_client(customer_runtime.clone())
        .await
        .map_err(|e| e.to_string())?;
    shopper
        .set_client(shopper_runtime)
        .await
        .map_err(|e| e.to_string())?;

    let seed = Seed::from("alice-seed-123");

    let span = tracing::info_span!("customer_checkout");
    async {
        RuntimeProfiles::new(
            customer_runtime,
            customer.config().cart_role.as_str(),
            customer.config().profiles_zome.as_str(),
        )
        .create_profile(&Profile {
            nickname: Some("Alice".into()),
            ..Default::default()
        })
        .await
        .map_err(|e| e.to_string())?;

        let orders = &customer.orders;
        orders
            .add_item(
                &seed,
                &CartProduct {
                    product_id: "bananas".into(),
                    product_name: "Bananas".into(),
                    product_image_url: None,
                    price_at_checkout: 0.59,
                    promo_price: None,
                    quantity: 6,
                    timestamp: Utc::now().timestamp_micros(),
                    note: Some("not too ripe".into()),
                },
            )
            .await
            .map_err(|e| e.to_string())?;
        orders
            .set_delivery_time_slot(
                &seed,
                &DeliveryTimeSlot {
                    date: Utc::now().timestamp_millis(),
                    time_slot: "2pm-4pm".into(),
                },
            )
            .await
            .map_err(|e| e.to_string())?;

        let posting = OrderPosting {
            customer_name: "Alice".into(),
            estimated_total: "3.54".into(),
            delivery_time: "2pm-4pm".into(),
        };
        let action_hash = orders
            .post_order(&seed, posting)
            .await
            .map_err(|e| e.to_string())?;
        info!(%action_hash, "Customer posted order");
        Ok::<_, String>(())
    }
    .instrument(span)
    .await?;

    let span = tracing::info_span!("shopper_browse");
    let browse = async {
        let orders = shopper.orders.list_orders().await?;
        for order in &orders {
            info!(id = %order.id, customer = %order.customer_name, total = %order.estimated_total, "Available order");
        }

        let Some(first) = orders.first() else {
            return Ok(());
        };
        let detail = shopper.orders.load_order_details(&first.id).await?;
        info!(
            items = detail.products.len(),
            delivery = ?detail.delivery_time_display,
            "Opened order"
        );

        shopper
            .orders
            .notify(
                &first.id,
                &CartSignal::ShopperJoined {
                    shopper_name: "Bob".into(),
                },
            )
            .await
    }
    .instrument(span)
    .await;

    if let Err(e) = browse {
        error!(error = %e, "Shopper flow failed");
    }
    info!(signals = network.signals(seed.as_str()).len(), "Signals delivered");

    customer.shutdown().await?;
    shopper.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
