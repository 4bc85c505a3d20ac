//! Ordered supervision of sibling services.
//!
//! Services are initialized and started in registration order and stopped
//! in reverse. A failed start stops whatever was already started.

use crate::lifecycle::{LifecycleError, Service};

/// A lifecycle failure attributed to one service.
#[derive(Debug, thiserror::Error)]
#[error("{service}: {source}")]
pub struct ServiceFailure {
    pub service: String,
    #[source]
    pub source: LifecycleError,
}

#[derive(Default)]
pub struct ServiceRegistry {
    services: Vec<Box<dyn Service>>,
    started: usize,
}

impl ServiceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, service: Box<dyn Service>) {
        tracing::debug!(service = service.name(), "Registered service");
        self.services.push(service);
    }

    pub fn names(&self) -> Vec<&str> {
        self.services.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    pub async fn initialize_all(&mut self) -> Result<(), ServiceFailure> {
        for service in &mut self.services {
            service.initialize().await.map_err(|source| failure(service.as_ref(), source))?;
        }
        Ok(())
    }

    pub async fn start_all(&mut self) -> Result<(), ServiceFailure> {
        while self.started < self.services.len() {
            let service = &mut self.services[self.started];
            if let Err(source) = service.start().await {
                let failed = failure(service.as_ref(), source);
                tracing::error!(error = %failed, "Service failed to start, stopping started services");
                // Unwind; the start failure is what callers need to see.
                let _ = self.stop_all().await;
                return Err(failed);
            }
            tracing::info!(service = service.name(), "Service started");
            self.started += 1;
        }
        Ok(())
    }

    /// Stop started services in reverse order, collecting every failure.
    pub async fn stop_all(&mut self) -> Result<(), Vec<ServiceFailure>> {
        let mut failures = Vec::new();
        while self.started > 0 {
            self.started -= 1;
            let service = &mut self.services[self.started];
            match service.stop().await {
                Ok(()) => tracing::info!(service = service.name(), "Service stopped"),
                Err(source) => {
                    let failed = failure(service.as_ref(), source);
                    tracing::error!(error = %failed, "Service failed to stop");
                    failures.push(failed);
                }
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

fn failure(service: &dyn Service, source: LifecycleError) -> ServiceFailure {
    ServiceFailure {
        service: service.name().to_string(),
        source,
    }
}
