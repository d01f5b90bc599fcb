// tests/common/mod.rs

//! Shared test utilities and helpers for integration tests.

#![allow(dead_code)]

use next2expo::analyzer::ProjectAnalyzer;
use next2expo::config::AnalysisSettings;
use next2expo::ProjectAnalysis;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Write `content` to `root/relative`, creating parent directories.
pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// Create a small pages-router TypeScript project.
///
/// Returns the TempDir - keep it alive to prevent cleanup.
pub fn create_pages_project() -> TempDir {
    let temp_dir = tempfile::tempdir().unwrap();
    let root = temp_dir.path();

    write_file(
        root,
        "package.json",
        r#"{
  "name": "shop",
  "version": "1.0.0",
  "scripts": { "dev": "next dev", "build": "next build" },
  "dependencies": {
    "next": "14.1.0",
    "react": "18.2.0",
    "react-dom": "18.2.0",
    "axios": "^1.6.0",
    "react-icons": "^5.0.0"
  },
  "devDependencies": {
    "typescript": "^5.3.0"
  }
}
"#,
    );
    write_file(
        root,
        "tsconfig.json",
        r#"{ "compilerOptions": { "baseUrl": ".", "paths": { "@/*": ["./*"] } } }"#,
    );
    write_file(root, "next.config.js", "module.exports = { reactStrictMode: true };\n");

    write_file(
        root,
        "pages/index.tsx",
        r#"import Link from 'next/link';
import Header from '../components/Header';
import { useCart } from '@/hooks/useCart';
import styles from '../styles/Home.module.css';

export default function Home() {
  const { count } = useCart();
  return (
    <div className={styles.main}>
      <Header title="Shop" />
      <p>{count} items</p>
      <Link href="/about">About</Link>
    </div>
  );
}
"#,
    );
    write_file(
        root,
        "pages/about.tsx",
        r#"import Header from '../components/Header';

export default function About() {
  return (
    <div>
      <Header title="About" />
      <p>We sell things.</p>
    </div>
  );
}
"#,
    );
    write_file(
        root,
        "pages/_app.tsx",
        r#"import type { AppProps } from 'next/app';
import '../styles/globals.css';

export default function App({ Component, pageProps }: AppProps) {
  return <Component {...pageProps} />;
}
"#,
    );
    write_file(
        root,
        "pages/api/hello.ts",
        r#"import type { NextApiRequest, NextApiResponse } from 'next';

export default function handler(req: NextApiRequest, res: NextApiResponse) {
  if (req.method === 'GET') {
    res.status(200).json({ name: 'shop' });
  }
}
"#,
    );
    write_file(
        root,
        "components/Header.tsx",
        r#"type Props = { title: string };

export default function Header({ title }: Props) {
  return (
    <header>
      <h1>{title}</h1>
    </header>
  );
}
"#,
    );
    write_file(
        root,
        "hooks/useCart.ts",
        r#"import { useState } from 'react';

export function useCart() {
  const [count, setCount] = useState(0);
  return { count, add: () => setCount(count + 1) };
}
"#,
    );
    write_file(root, "styles/Home.module.css", ".main { padding: 1rem; }\n");
    write_file(root, "styles/globals.css", "body { margin: 0; }\n");
    write_file(root, "public/logo.svg", "<svg xmlns=\"http://www.w3.org/2000/svg\"></svg>\n");

    temp_dir
}

/// Analyze `root` with default settings.
pub fn analyze(root: &Path) -> ProjectAnalysis {
    ProjectAnalyzer::new(&AnalysisSettings::default())
        .analyze(root)
        .unwrap()
}
