#[test]
fn readme_is_in_sync() {
    version_sync::assert_markdown_deps_updated!("README.md");
}
