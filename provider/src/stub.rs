//! An in-memory `VideoProvider` for worker and property tests. Each method
//! returns the next scripted response from its queue; an empty queue is a
//! test bug, not a transient failure, so it panics rather than returning an
//! error a worker might swallow.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use videogen_protocol::VideoRequest;

use crate::error::Result;
use crate::types::Avatar;
use crate::types::CreateJobOutcome;
use crate::types::CreditBalance;
use crate::types::JobStatusReport;
use crate::types::Voice;
use crate::VideoProvider;

#[derive(Default)]
pub struct StubVideoProvider {
    create_job: Mutex<VecDeque<Result<CreateJobOutcome>>>,
    check_job_status: Mutex<VecDeque<Result<JobStatusReport>>>,
    calls: Mutex<Vec<Call>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateJob,
    CheckJobStatus(String),
}

impl StubVideoProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_create_job(&self, outcome: Result<CreateJobOutcome>) {
        self.create_job.lock().unwrap().push_back(outcome);
    }

    pub fn push_check_job_status(&self, report: Result<JobStatusReport>) {
        self.check_job_status.lock().unwrap().push_back(report);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VideoProvider for StubVideoProvider {
    async fn create_job(&self, _request: &VideoRequest) -> Result<CreateJobOutcome> {
        self.calls.lock().unwrap().push(Call::CreateJob);
        self.create_job
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub exhausted: no scripted create_job response left")
    }

    async fn check_job_status(&self, provider_job_id: &str) -> Result<JobStatusReport> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::CheckJobStatus(provider_job_id.to_string()));
        self.check_job_status
            .lock()
            .unwrap()
            .pop_front()
            .expect("stub exhausted: no scripted check_job_status response left")
    }

    async fn list_avatars(&self) -> Result<Vec<Avatar>> {
        Ok(Vec::new())
    }

    async fn list_voices(&self) -> Result<Vec<Voice>> {
        Ok(Vec::new())
    }

    async fn get_credit_balance(&self) -> Result<CreditBalance> {
        Ok(CreditBalance { credits: 0 })
    }
}
