//! Region filtering over the channel catalog

use crate::models::{Channel, Region};

/// Channels available in `region`, in catalog order.
///
/// The returned iterator is lazy and `Clone`, so a caller can walk the same
/// selection more than once (headers first, then guide fetches) without
/// re-running the filter or copying channels.
pub fn filter_by_region<'a>(
    channels: &'a [Channel],
    region: &'a Region,
) -> impl Iterator<Item = &'a Channel> + Clone + 'a {
    channels
        .iter()
        .filter(move |channel| channel.available_in(region))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn channel(id: u32, regions: &[&str]) -> Channel {
        Channel {
            channel_id: id,
            name: format!("Channel {id}"),
            logo: String::new(),
            regions: regions.iter().map(|r| Region::new(r)).collect(),
            url: Some(format!("https://streams.example.com/{id}.m3u8")),
            stream_fetcher: None,
            epg_url: None,
        }
    }

    fn sample() -> Vec<Channel> {
        vec![
            channel(1, &["eu", "us"]),
            channel(2, &["eu"]),
            channel(3, &["us"]),
            channel(4, &[]),
            channel(5, &["eu", "us"]),
        ]
    }

    #[rstest]
    #[case("eu", vec![1, 2, 5])]
    #[case("us", vec![1, 3, 5])]
    #[case("US", vec![1, 3, 5])]
    #[case("asia", vec![])]
    fn test_filter_preserves_catalog_order(#[case] region: &str, #[case] expected: Vec<u32>) {
        let channels = sample();
        let region = Region::new(region);
        let ids: Vec<u32> = filter_by_region(&channels, &region)
            .map(|c| c.channel_id)
            .collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_filter_is_restartable() {
        let channels = sample();
        let region = Region::new("eu");
        let selection = filter_by_region(&channels, &region);

        let first: Vec<u32> = selection.clone().map(|c| c.channel_id).collect();
        let second: Vec<u32> = selection.map(|c| c.channel_id).collect();
        assert_eq!(first, second);
        assert_eq!(channels.len(), 5);
    }

    #[test]
    fn test_filter_returns_exact_subset() {
        let channels = sample();
        let region = Region::new("us");
        let selected: Vec<&Channel> = filter_by_region(&channels, &region).collect();

        for c in &channels {
            let included = selected.iter().any(|s| s.channel_id == c.channel_id);
            assert_eq!(included, c.available_in(&region));
        }
    }
}
