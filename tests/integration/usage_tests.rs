//! Usage model integration tests
//!
//! Each test lays out a small Android project on disk, feeds it through
//! discovery and the usage builder, and checks the unused resource list.

use shrinkres::usage::DirectiveKind;
use shrinkres::{
    Config, FileFinder, ParallelUsageBuilder, ResourceType, ResourceUsageModel, ShrinkMode,
    StringPool, UsageBuilder,
};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const ANDROID_NS: &str = r#"xmlns:android="http://schemas.android.com/apk/res/android""#;
const TOOLS_NS: &str = r#"xmlns:tools="http://schemas.android.com/tools""#;

struct Project {
    dir: TempDir,
}

impl Project {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn file(self, path: &str, contents: &str) -> Self {
        let full = self.dir.path().join(path);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, contents).unwrap();
        self
    }

    fn root(&self) -> &Path {
        self.dir.path()
    }

    fn model(&self) -> ResourceUsageModel {
        let config = Config::default();
        let files = FileFinder::new(&config).find_files(self.root()).unwrap();
        let mut model = ResourceUsageModel::new();
        UsageBuilder::new().build(&mut model, &files);
        model
    }

    fn unused(&self) -> BTreeSet<String> {
        unused_urls(&mut self.model())
    }
}

fn unused_urls(model: &mut ResourceUsageModel) -> BTreeSet<String> {
    model.resolve_directives();
    model
        .find_unused()
        .into_iter()
        .map(|id| model.resource(id).url())
        .collect()
}

fn set(urls: &[&str]) -> BTreeSet<String> {
    urls.iter().map(|s| s.to_string()).collect()
}

fn strings(names: &[&str]) -> String {
    let body: String = names
        .iter()
        .map(|n| format!("<string name=\"{}\">{}</string>\n", n, n))
        .collect();
    format!("<resources>\n{}</resources>", body)
}

#[test]
fn test_code_reference_reaches_layout_contents() {
    let project = Project::new()
        .file("app/src/main/java/Main.kt", "setContentView(R.layout.activity_main)")
        .file(
            "app/src/main/res/layout/activity_main.xml",
            &format!(
                r#"<TextView {} android:text="@string/title" android:background="@drawable/bg"/>"#,
                ANDROID_NS
            ),
        )
        .file("app/src/main/res/values/strings.xml", &strings(&["title", "unused_label"]))
        .file("app/src/main/res/drawable/bg.xml", "<shape/>")
        .file("app/src/main/res/drawable-hdpi/old.png", "\u{89}PNG");

    assert_eq!(
        project.unused(),
        set(&["@drawable/old", "@string/unused_label"])
    );
}

#[test]
fn test_unreferenced_layout_keeps_its_targets_unused() {
    let project = Project::new()
        .file(
            "res/layout/orphan.xml",
            &format!(r#"<TextView {} android:text="@string/title"/>"#, ANDROID_NS),
        )
        .file("res/values/strings.xml", &strings(&["title"]));

    assert_eq!(project.unused(), set(&["@layout/orphan", "@string/title"]));
}

#[test]
fn test_manifest_marks_resources_reachable() {
    let project = Project::new()
        .file(
            "app/src/main/AndroidManifest.xml",
            &format!(
                r#"<manifest {}><application android:icon="@mipmap/ic_launcher"
                    android:theme="@style/AppTheme"/></manifest>"#,
                ANDROID_NS
            ),
        )
        .file("app/src/main/res/mipmap-xxhdpi/ic_launcher.png", "\u{89}PNG")
        .file(
            "app/src/main/res/values/styles.xml",
            r#"<resources>
                <style name="AppTheme" parent="Base.AppTheme"/>
                <style name="Base.AppTheme"><item name="colorPrimary">@color/primary</item></style>
                <style name="Unused"/>
            </resources>"#,
        )
        .file(
            "app/src/main/res/values/colors.xml",
            r#"<resources><color name="primary">#fff</color></resources>"#,
        );

    assert_eq!(project.unused(), set(&["@style/Unused"]));
}

#[test]
fn test_data_binding_expression() {
    let project = Project::new()
        .file("src/Main.java", "bind(R.layout.bound);")
        .file(
            "res/layout/bound.xml",
            &format!(
                r#"<layout {}>
                    <TextView android:id="@+id/label"
                        android:text="@{{user.vip ? @string/greeting : @string/plain}}"/>
                </layout>"#,
                ANDROID_NS
            ),
        )
        .file("res/values/strings.xml", &strings(&["greeting", "plain", "other"]));

    let mut model = project.model();
    let label = model.registry().lookup(ResourceType::Id, "label").unwrap();
    assert!(model.resource(label).is_reachable());
    assert_eq!(unused_urls(&mut model), set(&["@string/other"]));
}

#[test]
fn test_css_url_resolves_against_file_resources() {
    let project = Project::new()
        .file("src/Web.kt", "load(R.raw.style)")
        .file(
            "res/raw/style.css",
            ".hero { background: url('file:///android_res/drawable/hero.png'); }",
        )
        .file("res/drawable/hero.png", "\u{89}PNG")
        .file("res/drawable/stale.png", "\u{89}PNG");

    assert_eq!(project.unused(), set(&["@drawable/stale"]));
}

#[test]
fn test_html_and_binary_markers() {
    let project = Project::new()
        .file("src/Web.kt", "load(R.raw.page); load(R.raw.blob)")
        .file(
            "res/raw/page.html",
            r#"<html><img src="file:///android_res/drawable/logo.png"></html>"#,
        )
        .file("res/raw/blob.bin", "\u{0}\u{1}android_res/drawable/packed.png\u{0}")
        .file("res/drawable/logo.png", "\u{89}PNG")
        .file("res/drawable/packed.png", "\u{89}PNG");

    assert!(project.unused().is_empty());
}

#[test]
fn test_unresolved_web_urls_go_to_string_pool() {
    let project = Project::new()
        .file("src/Web.kt", "load(R.raw.page); load(R.raw.theme)")
        .file("res/raw/page.html", r#"<html><img src="unknown.png"></html>"#)
        .file("res/raw/theme.css", ".x { background: url(missing.png); }")
        .file("res/drawable/unknown.png", "\u{89}PNG")
        .file("res/drawable/missing.png", "\u{89}PNG");

    let config = Config::default();
    let files = FileFinder::new(&config).find_files(project.root()).unwrap();
    let mut model = ResourceUsageModel::new().with_hook(StringPool::new());
    UsageBuilder::new().build(&mut model, &files);

    let pooled: Vec<&str> = model.hook().strings().collect();
    assert!(pooled.contains(&"unknown.png"));
    assert!(pooled.contains(&"missing.png"));

    model.resolve_directives();
    let unused: BTreeSet<String> = model
        .find_unused()
        .into_iter()
        .map(|id| model.resource(id).url())
        .collect();
    assert_eq!(unused, set(&["@drawable/missing", "@drawable/unknown"]));
}

#[test]
fn test_cycle_alone_is_unused() {
    let project = Project::new()
        .file(
            "res/drawable/a.xml",
            &format!(r#"<layer-list {}><item android:drawable="@drawable/b"/></layer-list>"#, ANDROID_NS),
        )
        .file(
            "res/drawable/b.xml",
            &format!(r#"<layer-list {}><item android:drawable="@drawable/a"/></layer-list>"#, ANDROID_NS),
        );

    assert_eq!(project.unused(), set(&["@drawable/a", "@drawable/b"]));
}

#[test]
fn test_cycle_reached_from_code() {
    let project = Project::new()
        .file("src/Main.kt", "icon(R.drawable.a)")
        .file(
            "res/drawable/a.xml",
            &format!(r#"<layer-list {}><item android:drawable="@drawable/b"/></layer-list>"#, ANDROID_NS),
        )
        .file(
            "res/drawable/b.xml",
            &format!(r#"<layer-list {}><item android:drawable="@drawable/a"/></layer-list>"#, ANDROID_NS),
        );

    assert!(project.unused().is_empty());
}

#[test]
fn test_tools_keep_and_discard_in_keep_file() {
    let project = Project::new()
        .file(
            "res/raw/keep.xml",
            &format!(
                r#"<resources {} tools:keep="@layout/unused*,@raw/keep" tools:discard="@layout/unused2"/>"#,
                TOOLS_NS
            ),
        )
        .file("res/layout/unused1.xml", "<FrameLayout/>")
        .file("res/layout/unused2.xml", "<FrameLayout/>")
        .file("res/layout/other.xml", "<FrameLayout/>")
        .file("src/Main.kt", "show(R.layout.unused2)");

    let mut model = project.model();
    assert_eq!(
        unused_urls(&mut model),
        set(&["@layout/other", "@layout/unused2"])
    );
    assert!(model.dump_whitelist().contains("unused1"));
}

#[test]
fn test_config_directives_and_shrink_mode() {
    let project = Project::new()
        .file(
            "res/values/strings.xml",
            &strings(&["feature_a", "feature_b", "legacy"]),
        )
        .file(
            "res/raw/keep.xml",
            &format!(r#"<resources {} tools:keep="@raw/keep" tools:shrinkMode="strict"/>"#, TOOLS_NS),
        );

    let mut model = project.model();
    assert_eq!(model.shrink_mode(), ShrinkMode::Strict);

    model.record_directive(DirectiveKind::Keep, "@string/feature_*");
    assert_eq!(unused_urls(&mut model), set(&["@string/legacy"]));
}

#[test]
fn test_service_keys_and_attrs_are_exempt() {
    let project = Project::new()
        .file(
            "res/values/values.xml",
            r#"<resources>
                <string name="google_app_id">1:2:3</string>
                <string name="com.crashlytics.android.build_id">x</string>
                <attr name="cornerSize" format="dimension"/>
                <declare-styleable name="Chip"><attr name="cornerSize"/></declare-styleable>
                <dimen name="margin">4dp</dimen>
            </resources>"#,
        );

    assert_eq!(project.unused(), set(&["@dimen/margin"]));
}

#[test]
fn test_analysis_is_idempotent() {
    let project = Project::new()
        .file("src/Main.kt", "setContentView(R.layout.main)")
        .file(
            "res/layout/main.xml",
            &format!(r#"<TextView {} android:text="@string/title"/>"#, ANDROID_NS),
        )
        .file("res/values/strings.xml", &strings(&["title", "spare"]));

    let mut model = project.model();
    let first = unused_urls(&mut model);
    let second = unused_urls(&mut model);
    assert_eq!(first, second);
    assert_eq!(first, set(&["@string/spare"]));
}

#[test]
fn test_parallel_builder_matches_sequential() {
    let project = Project::new()
        .file("src/Main.kt", "setContentView(R.layout.main); val s = \"dynamic_name\"")
        .file(
            "res/layout/main.xml",
            &format!(r#"<ImageView {} android:src="@drawable/icon"/>"#, ANDROID_NS),
        )
        .file("res/drawable/icon.xml", "<vector/>")
        .file("res/drawable/spare.xml", "<vector/>");

    let config = Config::default();
    let files = FileFinder::new(&config).find_files(project.root()).unwrap();

    let mut sequential = ResourceUsageModel::new().with_hook(StringPool::new());
    UsageBuilder::new().build(&mut sequential, &files);
    let mut parallel = ResourceUsageModel::new().with_hook(StringPool::new());
    ParallelUsageBuilder::new().build(&mut parallel, &files);

    assert_eq!(sequential.dump_resource_model(), parallel.dump_resource_model());
    assert!(parallel.hook().strings().any(|s| s == "dynamic_name"));

    sequential.resolve_directives();
    let unused: Vec<String> = sequential
        .find_unused()
        .into_iter()
        .map(|id| sequential.resource(id).url())
        .collect();
    assert_eq!(unused, vec!["@drawable/spare".to_string()]);
}
