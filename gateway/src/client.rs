//! Booking API client: the [`FlightGateway`] seam and its reqwest implementation

use crate::{
    error::GatewayError,
    retry::{RetryPolicy, retry_with_predicate},
    types::{Booking, BookingId, CreateBookingRequest, Flight, FlightId, SearchParams, Seat},
};
use async_trait::async_trait;
use reqwest::{Client, Response, Url};
use serde::{Deserialize, de::DeserializeOwned};
use std::time::Duration;

/// Remote operations the booking flow depends on
///
/// Every call is a single request/response; implementations decide whether idempotent
/// reads are retried.
#[async_trait]
pub trait FlightGateway: Send + Sync {
    /// `POST /flights/search`
    async fn search_flights(&self, params: &SearchParams) -> Result<Vec<Flight>, GatewayError>;

    /// `GET /flights/{id}`
    async fn get_flight(&self, id: &FlightId) -> Result<Flight, GatewayError>;

    /// `GET /flights/{id}/seats`
    async fn get_seats(&self, flight_id: &FlightId) -> Result<Vec<Seat>, GatewayError>;

    /// `POST /bookings`
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, GatewayError>;

    /// `GET /bookings/{id}`
    async fn get_booking(&self, id: &BookingId) -> Result<Booking, GatewayError>;

    /// `DELETE /bookings/{id}`
    async fn cancel_booking(&self, id: &BookingId) -> Result<(), GatewayError>;
}

/// Error body the API returns with non-2xx responses (`{"error": "..."}`)
#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// HTTP implementation of [`FlightGateway`]
#[derive(Clone, Debug)]
pub struct HttpGateway {
    client: Client,
    base_url: Url,
    read_retry: RetryPolicy,
}

impl HttpGateway {
    /// Create a client for the API rooted at `base_url` (`http://localhost:8080/api`)
    ///
    /// Reads are retried according to [`RetryPolicy::default`].
    ///
    /// # Errors
    ///
    /// Returns `GatewayError::InvalidUrl` if `base_url` is not an absolute http(s) URL, or
    /// `GatewayError::Transport` if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GatewayError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| GatewayError::InvalidUrl(format!("{base_url}: {e}")))?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(GatewayError::InvalidUrl(base_url.to_string()));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            read_retry: RetryPolicy::default(),
        })
    }

    /// Replace the retry policy used for `GET` requests
    #[must_use]
    pub fn with_read_retry(mut self, policy: RetryPolicy) -> Self {
        self.read_retry = policy;
        self
    }

    /// The API base URL
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, GatewayError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| GatewayError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, GatewayError> {
        let url = &self.endpoint(segments)?;
        let client = &self.client;

        retry_with_predicate(
            &self.read_retry,
            || async move {
                let response = client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| GatewayError::Transport(e.to_string()))?;
                decode(response).await
            },
            GatewayError::is_retryable,
        )
        .await
    }
}

#[async_trait]
impl FlightGateway for HttpGateway {
    #[tracing::instrument(skip(self, params), fields(origin = %params.origin, destination = %params.destination))]
    async fn search_flights(&self, params: &SearchParams) -> Result<Vec<Flight>, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(&["flights", "search"])?)
            .json(params)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let flights: Vec<Flight> = decode(response).await?;
        tracing::debug!(count = flights.len(), "Search returned flights");
        Ok(flights)
    }

    #[tracing::instrument(skip(self), fields(flight_id = %id))]
    async fn get_flight(&self, id: &FlightId) -> Result<Flight, GatewayError> {
        self.get_json(&["flights", id.as_str()]).await
    }

    #[tracing::instrument(skip(self), fields(flight_id = %flight_id))]
    async fn get_seats(&self, flight_id: &FlightId) -> Result<Vec<Seat>, GatewayError> {
        self.get_json(&["flights", flight_id.as_str(), "seats"]).await
    }

    #[tracing::instrument(skip(self, request), fields(flight_id = %request.flight_id, passengers = request.passengers.len()))]
    async fn create_booking(&self, request: &CreateBookingRequest) -> Result<Booking, GatewayError> {
        let response = self
            .client
            .post(self.endpoint(&["bookings"])?)
            .json(request)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        let booking: Booking = decode(response).await?;
        tracing::info!(booking_id = %booking.id, reference = %booking.booking_reference, "Booking created");
        Ok(booking)
    }

    #[tracing::instrument(skip(self), fields(booking_id = %id))]
    async fn get_booking(&self, id: &BookingId) -> Result<Booking, GatewayError> {
        self.get_json(&["bookings", id.as_str()]).await
    }

    #[tracing::instrument(skip(self), fields(booking_id = %id))]
    async fn cancel_booking(&self, id: &BookingId) -> Result<(), GatewayError> {
        let response = self
            .client
            .delete(self.endpoint(&["bookings", id.as_str()])?)
            .send()
            .await
            .map_err(|e| GatewayError::Transport(e.to_string()))?;

        check_status(response).await?;
        tracing::info!("Booking cancelled");
        Ok(())
    }
}

/// Turn a non-2xx response into `GatewayError::Status`
async fn check_status(response: Response) -> Result<Response, GatewayError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|api| api.error)
        .unwrap_or(body);

    tracing::debug!(status = status.as_u16(), %message, "API returned error status");
    Err(GatewayError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, GatewayError> {
    let response = check_status(response).await?;
    let bytes = response
        .bytes()
        .await
        .map_err(|e| GatewayError::Transport(e.to_string()))?;

    serde_json::from_slice(&bytes).map_err(|e| GatewayError::Decode(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code
mod tests {
    use super::*;

    fn gateway(base: &str) -> HttpGateway {
        HttpGateway::new(base, Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn endpoint_joins_segments_under_base_path() {
        let gateway = gateway("http://localhost:8080/api");
        assert_eq!(
            gateway.endpoint(&["flights", "FL001", "seats"]).unwrap().as_str(),
            "http://localhost:8080/api/flights/FL001/seats"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let gateway = gateway("http://localhost:8080/api/");
        assert_eq!(
            gateway.endpoint(&["bookings"]).unwrap().as_str(),
            "http://localhost:8080/api/bookings"
        );
    }

    #[test]
    fn endpoint_escapes_ids() {
        let gateway = gateway("http://localhost:8080/api");
        assert_eq!(
            gateway.endpoint(&["bookings", "a/b"]).unwrap().as_str(),
            "http://localhost:8080/api/bookings/a%2Fb"
        );
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(matches!(
            HttpGateway::new("ws://localhost:8080/api", Duration::from_secs(1)),
            Err(GatewayError::InvalidUrl(_))
        ));
        assert!(matches!(
            HttpGateway::new("not a url", Duration::from_secs(1)),
            Err(GatewayError::InvalidUrl(_))
        ));
    }
}
