use async_trait::async_trait;
use cart_finder::clients::{DiscoveryPoster, DiscoveryReader, JoinError, ProfileError, StaticProfiles};
use cart_finder::lifecycle::{FinderConfig, FinderSystem};
use cart_finder::model::{
    AgentPubKey, AppInfo, CartProduct, CartSignal, DeliveryTimeSlot, OrderDetail, OrderPosting,
    PartitionHandle, Seed, STATUS_POSTED,
};
use cart_finder::orders::{OrderError, ServiceResponse};
use cart_finder::runtime::memory::{InMemoryRuntime, MemoryNetwork};
use cart_finder::runtime::{
    zome, CreatePartitionRequest, InvokeRequest, RuntimeClient, RuntimeError,
};
use std::sync::Arc;

fn agent(byte: u8) -> AgentPubKey {
    AgentPubKey(vec![byte; 32])
}

fn posting(total: &str, delivery_time: &str) -> OrderPosting {
    OrderPosting {
        customer_name: "Alice".into(),
        estimated_total: total.into(),
        delivery_time: delivery_time.into(),
    }
}

/// Publish one advertisement per `(agent byte, seed)` pair.
async fn publish_all(network: &MemoryNetwork, carts: &[(u8, &str)]) {
    for &(byte, seed) in carts {
        let poster = DiscoveryPoster::new(
            Arc::new(network.connect(agent(byte))),
            zome::ORDER_FINDER_ROLE,
            zome::ORDER_FINDER_ZOME,
        );
        poster
            .publish(&Seed::from(seed), posting("10.00", "noon"))
            .await
            .unwrap();
    }
}

/// Passes everything through, but replaces one element of the order listing with
/// an advertisement that lacks its request.
struct DamagedListing {
    inner: Arc<InMemoryRuntime>,
    index: usize,
}

#[async_trait]
impl RuntimeClient for DamagedListing {
    fn my_pub_key(&self) -> AgentPubKey {
        self.inner.my_pub_key()
    }

    async fn app_info(&self) -> Result<AppInfo, RuntimeError> {
        self.inner.app_info().await
    }

    async fn create_partition(
        &self,
        request: CreatePartitionRequest,
    ) -> Result<PartitionHandle, RuntimeError> {
        self.inner.create_partition(request).await
    }

    async fn invoke(&self, request: InvokeRequest) -> Result<Vec<u8>, RuntimeError> {
        let listing = request.fn_name == zome::GET_AVAILABLE_ORDERS;
        let bytes = self.inner.invoke(request).await?;
        if !listing {
            return Ok(bytes);
        }

        let mut ads: Vec<rmpv::Value> = rmp_serde::from_slice(&bytes).unwrap();
        ads[self.index] = rmpv::Value::Map(vec![(
            rmpv::Value::from("action_hash"),
            rmpv::Value::Array(vec![
                rmpv::Value::from(1u8),
                rmpv::Value::from(2u8),
                rmpv::Value::from(3u8),
            ]),
        )]);
        Ok(rmp_serde::to_vec_named(&ads).unwrap())
    }
}

/// Customer posts, shopper lists and opens the order, over one shared network.
#[tokio::test]
async fn customer_posts_and_shopper_opens_order() {
    let network = MemoryNetwork::new();
    let customer_runtime = Arc::new(network.connect(agent(1)));
    let shopper_runtime = Arc::new(network.connect(agent(2)));
    let seed = Seed::from("alice-seed-123");

    // Customer side
    let customer = FinderSystem::new(FinderConfig::default());
    customer.set_client(customer_runtime.clone()).await.unwrap();
    customer
        .orders
        .set_delivery_time_slot(
            &seed,
            &DeliveryTimeSlot {
                date: 1_704_067_200_000,
                time_slot: "2pm-4pm".into(),
            },
        )
        .await
        .unwrap();

    let poster = DiscoveryPoster::new(
        customer_runtime.clone(),
        zome::ORDER_FINDER_ROLE,
        zome::ORDER_FINDER_ZOME,
    );
    poster.publish(&seed, posting("42.50", "2pm-4pm")).await.unwrap();

    let reader = DiscoveryReader::new(
        shopper_runtime.clone(),
        zome::ORDER_FINDER_ROLE,
        zome::ORDER_FINDER_ZOME,
    );
    let ads = reader.list().await.unwrap();
    assert_eq!(ads.len(), 1);
    assert_eq!(ads[0].seed(), &seed);
    assert_eq!(ads[0].request.status, STATUS_POSTED);
    assert_eq!(ads[0].request.estimated_total, "42.50");
    assert_eq!(ads[0].request.customer_pubkey, agent(1));

    // Shopper side
    let shopper = FinderSystem::new(FinderConfig::default());
    shopper.set_client(shopper_runtime.clone()).await.unwrap();

    let creates_before = shopper_runtime.create_calls();
    let summaries = shopper.orders.list_orders().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].id, seed);
    assert_eq!(summaries[0].status, "posted");
    assert!(summaries[0].products.is_empty());
    // Alice never published a profile.
    assert_eq!(summaries[0].customer_name, agent(1).short_id());

    // Listing reads only the discovery space.
    assert_eq!(shopper_runtime.create_calls(), creates_before);
    assert_eq!(shopper_runtime.invoke_calls(zome::GET_CURRENT_ITEMS), 0);

    let detail = shopper.orders.load_order_details(&seed).await.unwrap();
    assert_eq!(shopper_runtime.create_calls() - creates_before, 1);

    assert!(detail.products.is_empty());
    let slot = detail.delivery_time.expect("delivery slot was set");
    assert_eq!(slot.time_slot, "2pm-4pm");
    let display = detail.delivery_time_display.expect("slot renders");
    assert_eq!(display.date, "Monday, January 1, 2024");
    assert_eq!(display.time, "2pm-4pm");

    // Opening it again is served from the registry.
    shopper.orders.load_order_details(&seed).await.unwrap();
    assert_eq!(shopper_runtime.create_calls() - creates_before, 1);

    customer.shutdown().await.unwrap();
    shopper.shutdown().await.unwrap();
}

#[tokio::test]
async fn shopper_sees_items_added_after_listing() {
    let network = MemoryNetwork::new();
    let seed = Seed::from("bob-seed-456");

    let customer = FinderSystem::new(FinderConfig::default());
    customer
        .set_client(Arc::new(network.connect(agent(1))))
        .await
        .unwrap();
    let shopper = FinderSystem::new(FinderConfig::default());
    shopper
        .set_client(Arc::new(network.connect(agent(2))))
        .await
        .unwrap();

    customer
        .orders
        .post_order(&seed, posting("3.54", "9am-11am"))
        .await
        .unwrap();
    customer
        .orders
        .add_item(
            &seed,
            &CartProduct {
                product_id: "bananas".into(),
                product_name: "Bananas".into(),
                product_image_url: None,
                price_at_checkout: 0.59,
                promo_price: None,
                quantity: 6,
                timestamp: 0,
                note: None,
            },
        )
        .await
        .unwrap();
    customer
        .orders
        .set_delivery_instructions(&seed, "leave at the door")
        .await
        .unwrap();
    customer
        .orders
        .set_session_status(&seed, "checked_out")
        .await
        .unwrap();

    let detail = shopper.orders.load_order_details(&seed).await.unwrap();
    assert_eq!(detail.products.len(), 1);
    assert_eq!(detail.products[0].quantity, 6);
    assert_eq!(detail.delivery_instructions.as_deref(), Some("leave at the door"));
    assert_eq!(detail.session_status, "checked_out");
    assert!(detail.address.is_none());
    assert!(detail.delivery_time.is_none());

    shopper
        .orders
        .notify(
            &seed,
            &CartSignal::ShopperJoined {
                shopper_name: "Sam".into(),
            },
        )
        .await
        .unwrap();
    assert_eq!(
        network.signals(seed.as_str()),
        vec![CartSignal::ShopperJoined {
            shopper_name: "Sam".into()
        }]
    );
}

#[tokio::test]
async fn listing_survives_a_failing_profile_lookup() {
    let network = MemoryNetwork::new();
    publish_all(&network, &[(1, "seed-1"), (2, "seed-2"), (3, "seed-3")]).await;

    let profiles = StaticProfiles::new()
        .with_name(agent(1), "Ann")
        .with_failure(agent(2), ProfileError::Runtime(RuntimeError::Transport("timeout".into())))
        .with_nameless(agent(3));
    let shopper = FinderSystem::new(FinderConfig::default());
    shopper
        .set_client_with_profiles(Arc::new(network.connect(agent(9))), Arc::new(profiles))
        .await
        .unwrap();

    let summaries = shopper.orders.list_orders().await.unwrap();

    let names: Vec<&str> = summaries.iter().map(|s| s.customer_name.as_str()).collect();
    assert_eq!(names.len(), 3);
    assert_eq!(names[0], "Ann");
    assert_eq!(names[1], "Unknown Customer");
    assert_eq!(names[2], agent(3).short_id());
}

#[tokio::test]
async fn listing_skips_a_malformed_advertisement() {
    let network = MemoryNetwork::new();
    publish_all(&network, &[(1, "seed-1"), (2, "seed-2"), (3, "seed-3")]).await;
    assert_eq!(network.posted_orders(), 3);

    let shopper = FinderSystem::new(FinderConfig::default());
    let runtime = DamagedListing {
        inner: Arc::new(network.connect(agent(9))),
        index: 1,
    };
    shopper.set_client(Arc::new(runtime)).await.unwrap();

    let summaries = shopper.orders.list_orders().await.unwrap();

    let ids: Vec<&str> = summaries.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["seed-1", "seed-3"]);
}

#[tokio::test]
async fn detail_load_surfaces_a_failing_cart_read() {
    let network = MemoryNetwork::new();
    let seed = Seed::from("dana-seed-789");
    publish_all(&network, &[(1, seed.as_str())]).await;

    let shopper_runtime = Arc::new(network.connect(agent(2)));
    let shopper = FinderSystem::new(FinderConfig::default());
    shopper.set_client(shopper_runtime.clone()).await.unwrap();
    shopper_runtime.fail_calls(
        zome::GET_SESSION_DATA,
        RuntimeError::Transport("connection reset".into()),
    );

    let err = shopper.orders.load_order_details(&seed).await.unwrap_err();

    assert_eq!(
        err,
        OrderError::Runtime(RuntimeError::Transport("connection reset".into()))
    );
    assert_eq!(shopper_runtime.invoke_calls(zome::GET_SESSION_DATA), 1);

    // The join itself succeeded, so a retry goes straight to the reads.
    shopper_runtime.clear_faults();
    let creates = shopper_runtime.create_calls();
    assert!(shopper.orders.load_order_details(&seed).await.is_ok());
    assert_eq!(shopper_runtime.create_calls(), creates);
}

#[tokio::test]
async fn detail_load_surfaces_a_failing_join() {
    let network = MemoryNetwork::new();
    let seed = Seed::from("erin-seed-000");
    publish_all(&network, &[(1, seed.as_str())]).await;

    let shopper_runtime = Arc::new(network.connect(agent(2)));
    let shopper = FinderSystem::new(FinderConfig::default());
    shopper.set_client(shopper_runtime.clone()).await.unwrap();
    shopper_runtime.fail_creates_with(RuntimeError::Transport("refused".into()));

    let err = shopper.orders.load_order_details(&seed).await.unwrap_err();

    assert_eq!(
        err,
        OrderError::Join(JoinError::Runtime(RuntimeError::Transport("refused".into())))
    );
    assert_eq!(shopper_runtime.invoke_calls(zome::GET_CURRENT_ITEMS), 0);
}

#[tokio::test]
async fn operations_before_set_client_fail_with_typed_result() {
    let system = FinderSystem::new(FinderConfig::default());
    let seed = Seed::from("seed-x");

    let err = system.orders.load_order_details(&seed).await.unwrap_err();
    assert_eq!(
        err,
        OrderError::NotInitialized {
            operation: "load_order_details"
        }
    );

    let response: ServiceResponse<OrderDetail> = system.orders.load_order_details(&seed).await.into();
    assert!(!response.success);
    assert!(response.error.is_some());

    assert!(matches!(
        system.orders.list_orders().await,
        Err(OrderError::NotInitialized { .. })
    ));
    assert!(matches!(
        system.orders.post_order(&seed, posting("1", "now")).await,
        Err(OrderError::NotInitialized { .. })
    ));
    assert!(!system.orders.is_connected().await);

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn failed_own_partition_setup_leaves_client_unset() {
    let runtime: Arc<InMemoryRuntime> = Arc::new(MemoryNetwork::new().connect(agent(4)));
    runtime.fail_app_info_with(RuntimeError::Transport("refused".into()));
    let system = FinderSystem::new(FinderConfig::default());

    let err = system.set_client(runtime.clone()).await.unwrap_err();

    assert!(matches!(err, OrderError::Join(_)));
    assert!(!system.orders.is_connected().await);

    runtime.clear_faults();
    system.set_client(runtime).await.unwrap();
    assert!(system.orders.is_connected().await);
}
