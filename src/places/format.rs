use super::provider::RawPlace;
use super::types::PlaceInfo;

/// Embeddable map view of a single place
pub fn embed_url(key: &str, place_id: &str) -> String {
    format!("https://www.google.com/maps/embed/v1/place?key={key}&q=place_id:{place_id}")
}

/// Directions to a place. The address is inserted verbatim.
pub fn direction_url(place_id: &str, address: &str) -> String {
    format!(
        "https://www.google.com/maps/dir/?api=1&destination_place_id={place_id}&destination={address}"
    )
}

/// Convert a provider record into the client-facing shape
pub fn format_place(raw: &RawPlace, key: &str) -> PlaceInfo {
    PlaceInfo {
        name: raw.name.clone(),
        address: raw.formatted_address.clone(),
        rating: raw.rating,
        place_id: raw.place_id.clone(),
        maps_embed_url: embed_url(key, &raw.place_id),
        maps_direction_url: direction_url(&raw.place_id, &raw.formatted_address),
    }
}
