//! Provenance and metadata written for a bundle on disk.

use std::fs;
use std::path::Path;

use modbridge_bundler::{
    FsPackageResolver, ModuleRecord, Pipeline, PipelineOptions, read_bundle, write_bundle,
    write_metadata,
};
use modbridge_config::{BridgeConfig, ModuleMapping};
use serde_json::Value;

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn id(root: &Path, relative: &str) -> String {
    root.join(relative).display().to_string()
}

#[test]
fn metadata_lists_packages_by_final_id() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    write(
        &root.join("package.json"),
        r#"{"name": "dashboard", "version": "1.4.0", "repository": {"type": "git", "url": "https://example.com/dashboard.git"}}"#,
    );
    write(
        &root.join("node_modules/moment/package.json"),
        r#"{"name": "moment", "version": "2.29.4"}"#,
    );
    write(
        &root.join("node_modules/@jenkins-cd/js-modules/package.json"),
        r#"{"name": "@jenkins-cd/js-modules", "version": "0.0.10"}"#,
    );

    let index = id(root, "src/index.js");
    let moment = id(root, "node_modules/moment/moment.js");
    let client = id(root, "node_modules/@jenkins-cd/js-modules/index.js");
    let records = vec![
        ModuleRecord::new(index.as_str(), "require('moment')")
            .dep("moment", moment.as_str())
            .dep("@jenkins-cd/js-modules", client.as_str())
            .entry(),
        ModuleRecord::new(moment.as_str(), "/* moment */"),
        ModuleRecord::new(client.as_str(), ""),
    ];

    let mut config = BridgeConfig::default();
    config.bundle.name = "dashboard".into();
    config.bundle.host_plugin_id = Some("dashboard-plugin".into());
    config.mappings = vec![ModuleMapping::new("moment", "momentjs:momentjs2")];
    config.output.out_dir = root.join("dist");

    let output = Pipeline::new(PipelineOptions::from_config(&config, root))
        .with_resolver(Box::new(FsPackageResolver::new()))
        .run(records)
        .unwrap();

    write_bundle(&config.bundle_path(), &output.records, false).unwrap();
    write_metadata(&config.metadata_path(), &output.metadata).unwrap();

    let written = read_bundle(&root.join("dist/dashboard.json")).unwrap();
    assert_eq!(written, output.records);

    let metadata: Value =
        serde_json::from_str(&fs::read_to_string(root.join("dist/dashboard.metadata.json")).unwrap())
            .unwrap();
    assert_eq!(metadata["registryId"], "undefined:dashboard");
    assert_eq!(metadata["hostPluginId"], "dashboard-plugin");

    let modules = metadata["packMetadata"]["modules"].as_array().unwrap();
    assert_eq!(modules.len(), 3);
    assert_eq!(modules[0]["id"], 1);
    assert_eq!(modules[0]["package"], "dashboard");
    assert_eq!(modules[0]["repository"], "https://example.com/dashboard.git");
    assert_eq!(modules[0]["path"], "src/index.js");
    assert_eq!(modules[1]["id"], 2);
    assert_eq!(modules[1]["package"], "moment");
    assert_eq!(modules[1]["version"], "2.29.4");
    assert_eq!(modules[2]["package"], "@jenkins-cd/js-modules");
}
