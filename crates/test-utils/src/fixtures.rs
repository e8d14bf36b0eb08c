#![allow(dead_code)]

use std::path::{Path, PathBuf};

/// A namespace with a network policy, a deployment and a service that
/// satisfy every predefined rule.
pub const CLEAN_UNIT: &str = "\
apiVersion: v1
kind: Namespace
metadata:
  name: shop
---
apiVersion: networking.k8s.io/v1
kind: NetworkPolicy
metadata:
  name: default-deny
  namespace: shop
spec:
  podSelector: {}
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: shop
spec:
  template:
    metadata:
      labels:
        app.kubernetes.io/name: web
    spec:
      securityContext:
        runAsNonRoot: true
      containers:
      - name: web
        image: nginx
        resources:
          limits:
            cpu: 500m
          requests:
            cpu: 250m
        livenessProbe:
          httpGet:
            path: /healthz
        readinessProbe:
          httpGet:
            path: /ready
---
apiVersion: v1
kind: Service
metadata:
  name: api
  namespace: shop
";

/// A namespaced deployment with an `app` label, no security context and one
/// container with matching probes and no resource limits.
pub const FIXABLE_DEPLOYMENT: &str = "\
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: shop
spec:
  template:
    metadata:
      labels:
        app: web
    spec:
      containers:
      - name: web
        image: nginx
        livenessProbe:
          httpGet:
            path: /healthz
        readinessProbe:
          httpGet:
            path: /healthz
";

/// Two namespaces plus a service in neither.
pub const SPLIT_NAMESPACES: &str = "\
apiVersion: v1
kind: Namespace
metadata:
  name: one
---
apiVersion: v1
kind: Namespace
metadata:
  name: two
---
apiVersion: v1
kind: Service
metadata:
  name: api
  namespace: three
";

/// Write `content` to `dir/name`, creating parent directories.
pub fn write_fixture(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create fixture dir");
    }
    std::fs::write(&path, content).expect("write fixture");
    path
}
