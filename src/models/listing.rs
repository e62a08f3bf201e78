use serde::Deserialize;

/// A collection response. The backend paginates some list endpoints
/// (`{"count": .., "results": [..]}`) and returns bare arrays from others;
/// both decode here and [`Listing::into_vec`] yields the items.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Paged { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Paged { results } => results,
            Listing::Bare(items) => items,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dtos::post_dtos::Post;

    const POSTS: &str = r#"[{"id":1,"is_featured":true,"likes_count":5,"is_liked":false},
                           {"id":2,"is_featured":false,"likes_count":2,"is_liked":false}]"#;

    #[test]
    fn bare_and_paged_shapes_yield_the_same_items() {
        let bare: Listing<Post> = serde_json::from_str(POSTS).unwrap();
        let paged: Listing<Post> =
            serde_json::from_str(&format!(r#"{{"count":2,"next":null,"results":{POSTS}}}"#))
                .unwrap();
        assert_eq!(bare.into_vec(), paged.into_vec());
    }

    #[test]
    fn results_without_pagination_metadata_still_decode() {
        let listing: Listing<Post> =
            serde_json::from_str(&format!(r#"{{"results":{POSTS}}}"#)).unwrap();
        let ids: Vec<i64> = listing.into_vec().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn an_object_without_results_is_rejected() {
        let err = serde_json::from_str::<Listing<Post>>(r#"{"detail":"nope"}"#);
        assert!(err.is_err());
    }
}
