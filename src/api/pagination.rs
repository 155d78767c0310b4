//! Page envelopes and hypermedia links shared by every resource listing.

use serde::Deserialize;

use super::types::{Link, PagedResponse};

const fn default_page_number() -> i64 {
    1
}

const fn default_page_size() -> i64 {
    10
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    #[serde(default = "default_page_number")]
    pub page_number: i64,

    #[serde(default = "default_page_size")]
    pub page_size: i64,
}

impl Default for PageQuery {
    fn default() -> Self {
        Self {
            page_number: default_page_number(),
            page_size: default_page_size(),
        }
    }
}

/// A response body that carries its own id and navigation links.
pub trait Linked {
    fn id(&self) -> i32;

    fn set_links(&mut self, links: Vec<Link>);
}

/// Builds hrefs for one resource collection, e.g. `https://host/api/v1/motorcycles`.
#[derive(Debug, Clone)]
pub struct LinkFactory {
    collection: String,
}

impl LinkFactory {
    #[must_use]
    pub fn new(public_url: &str, collection_path: &str) -> Self {
        Self {
            collection: format!("{}{collection_path}", public_url.trim_end_matches('/')),
        }
    }

    #[must_use]
    pub fn item_href(&self, id: i32) -> String {
        format!("{}/{id}", self.collection)
    }

    #[must_use]
    pub fn page_href(&self, page_number: u64, page_size: u64) -> String {
        format!(
            "{}?pageNumber={page_number}&pageSize={page_size}",
            self.collection
        )
    }

    /// `self`, `update` and `delete` links for a single resource.
    #[must_use]
    pub fn resource_links(&self, id: i32) -> Vec<Link> {
        let href = self.item_href(id);
        vec![
            Link::new(href.clone(), "self", "GET"),
            Link::new(href.clone(), "update", "PUT"),
            Link::new(href, "delete", "DELETE"),
        ]
    }

    pub fn attach<T: Linked>(&self, mut item: T) -> T {
        item.set_links(self.resource_links(item.id()));
        item
    }
}

#[must_use]
pub const fn total_pages(total_records: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 0;
    }
    total_records.div_ceil(page_size)
}

/// Wraps an already ordered and windowed slice of items in a page envelope.
///
/// Bounds are not checked here: a page past the end simply has no items.
pub fn build_page<T: Linked>(
    items: Vec<T>,
    page_number: u64,
    page_size: u64,
    total_records: u64,
    links: &LinkFactory,
) -> PagedResponse<T> {
    let total_pages = total_pages(total_records, page_size);

    let mut page_links = vec![Link::new(
        links.page_href(page_number, page_size),
        "self",
        "GET",
    )];
    if page_number < total_pages {
        page_links.push(Link::new(
            links.page_href(page_number + 1, page_size),
            "next-page",
            "GET",
        ));
    }
    if page_number > 1 {
        page_links.push(Link::new(
            links.page_href(page_number - 1, page_size),
            "previous-page",
            "GET",
        ));
    }

    PagedResponse {
        data: items.into_iter().map(|item| links.attach(item)).collect(),
        page_number,
        page_size,
        total_records,
        total_pages,
        links: page_links,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Item {
        id: i32,
        links: Vec<Link>,
    }

    impl Linked for Item {
        fn id(&self) -> i32 {
            self.id
        }

        fn set_links(&mut self, links: Vec<Link>) {
            self.links = links;
        }
    }

    fn items(ids: std::ops::RangeInclusive<i32>) -> Vec<Item> {
        ids.map(|id| Item { id, links: vec![] }).collect()
    }

    fn factory() -> LinkFactory {
        LinkFactory::new("http://localhost:8080/", "/api/v1/motorcycles")
    }

    fn rels(page: &PagedResponse<Item>) -> Vec<&str> {
        page.links.iter().map(|l| l.rel.as_str()).collect()
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(0, 10), 0);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(12, 5), 3);
        for total in 0..50 {
            for size in 1..12 {
                let expected = (total + size - 1) / size;
                assert_eq!(total_pages(total, size), expected);
            }
        }
    }

    #[test]
    fn test_middle_page_has_both_neighbours() {
        let page = build_page(items(6..=10), 2, 5, 12, &factory());

        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
        assert_eq!(rels(&page), vec!["self", "next-page", "previous-page"]);
        assert_eq!(
            page.links[0].href,
            "http://localhost:8080/api/v1/motorcycles?pageNumber=2&pageSize=5"
        );
        assert_eq!(
            page.links[1].href,
            "http://localhost:8080/api/v1/motorcycles?pageNumber=3&pageSize=5"
        );
        assert_eq!(
            page.links[2].href,
            "http://localhost:8080/api/v1/motorcycles?pageNumber=1&pageSize=5"
        );
    }

    #[test]
    fn test_first_page_has_no_previous() {
        let page = build_page(items(1..=5), 1, 5, 12, &factory());
        assert_eq!(rels(&page), vec!["self", "next-page"]);
    }

    #[test]
    fn test_last_page_has_no_next() {
        let page = build_page(items(11..=12), 3, 5, 12, &factory());
        assert_eq!(rels(&page), vec!["self", "previous-page"]);
    }

    #[test]
    fn test_page_beyond_the_end() {
        let page = build_page(Vec::<Item>::new(), 7, 5, 12, &factory());
        assert!(page.data.is_empty());
        assert_eq!(page.total_pages, 3);
        assert_eq!(rels(&page), vec!["self", "previous-page"]);
    }

    #[test]
    fn test_empty_collection() {
        let page = build_page(Vec::<Item>::new(), 1, 10, 0, &factory());
        assert_eq!(page.total_pages, 0);
        assert_eq!(rels(&page), vec!["self"]);
    }

    #[test]
    fn test_every_item_gets_resource_links() {
        let page = build_page(items(1..=2), 1, 10, 2, &factory());
        let first = &page.data[0];

        assert_eq!(first.links.len(), 3);
        assert_eq!(
            first.links[0],
            Link::new("http://localhost:8080/api/v1/motorcycles/1", "self", "GET")
        );
        assert_eq!(first.links[1].method, "PUT");
        assert_eq!(first.links[2].rel, "delete");
    }

    #[test]
    fn test_relative_links_without_public_url() {
        let links = LinkFactory::new("", "/api/v1/roles");
        assert_eq!(links.item_href(2), "/api/v1/roles/2");
    }
}
