//! Starter project used by `playpen init`.

use crate::tree::{FileNode, FileTree};

const APP_COMPONENT_TS: &str = r#"import { Component } from '@angular/core';

@Component({
  selector: 'app-root',
  template: `
    <main class="card">
      <h1>{{ title }}</h1>
      <p>Clicked {{ count }} times</p>
      <button (click)="increment()">Click me</button>
      <button (click)="reset()">Reset</button>
    </main>
  `,
  styles: [`
    .card { font-family: sans-serif; padding: 1.5rem; }
    button { margin-right: 0.5rem; }
  `]
})
export class AppComponent {
  title = 'Hello from the playground';
  count = 0;

  increment() { this.count++; }

  reset() { this.count = 0; }
}
"#;

const MAIN_TS: &str = r#"import { bootstrapApplication } from '@angular/platform-browser';
import { AppComponent } from './app/app.component';

bootstrapApplication(AppComponent).catch(err => console.error(err));
"#;

const INDEX_HTML: &str = r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Playground</title>
</head>
<body>
  <app-root></app-root>
</body>
</html>
"#;

const STYLES_CSS: &str = "body { margin: 0; }\n";

const PACKAGE_JSON: &str = r#"{
  "name": "playground",
  "private": true,
  "dependencies": {
    "@angular/core": "^17.0.0",
    "@angular/platform-browser": "^17.0.0"
  }
}
"#;

/// Default project: a counter component under `src/app`
pub fn starter_project() -> FileTree {
    let app = FileNode::folder("app").with_children(vec![
        FileNode::file("app.component.ts", None).with_content(APP_COMPONENT_TS)
    ]);
    let mut src = FileNode::folder("src").with_children(vec![
        app,
        FileNode::file("main.ts", None).with_content(MAIN_TS),
        FileNode::file("index.html", None).with_content(INDEX_HTML),
        FileNode::file("styles.css", None).with_content(STYLES_CSS),
    ]);
    src.expanded = true;
    let package = FileNode::file("package.json", None).with_content(PACKAGE_JSON);

    let mut tree = FileTree::new();
    for root in [src, package] {
        // Names above are static and valid.
        let _ = tree.push_root(root);
    }
    tree
}
