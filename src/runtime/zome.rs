//! Role, zome, and remote function names exposed by the app.

pub const CART_ROLE: &str = "cart";
pub const ORDER_FINDER_ROLE: &str = "order_finder";

pub const CART_ZOME: &str = "cart";
pub const ORDER_FINDER_ZOME: &str = "order_finder";
pub const PROFILES_ZOME: &str = "profiles";

pub const POST_ORDER_REQUEST: &str = "post_order_request";
pub const GET_AVAILABLE_ORDERS: &str = "get_available_orders";

pub const GET_CURRENT_ITEMS: &str = "get_current_items";
pub const GET_SESSION_DATA: &str = "get_session_data";
pub const ADD_ITEM: &str = "add_item";
pub const SET_ADDRESS: &str = "set_address";
pub const SET_DELIVERY_TIME_SLOT: &str = "set_delivery_time_slot";
pub const SET_DELIVERY_INSTRUCTIONS: &str = "set_delivery_instructions";
pub const SET_SESSION_STATUS: &str = "set_session_status";
pub const SEND_REMOTE_SIGNAL: &str = "send_remote_signal";

pub const CREATE_PROFILE: &str = "create_profile";
pub const GET_AGENT_PROFILE: &str = "get_agent_profile";
