pub mod http_test_utils;
pub mod mock_event_source;
pub mod mock_gateway;
pub mod test_logging;
