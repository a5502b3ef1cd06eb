//! Runtime behavior of the emitted stub shape: a committed copy of what
//! `generate_stub` produces for a small session trait, exercised directly.
//! If synthesis changes shape, regenerate this stub alongside it.

use std::sync;

pub trait Session {
    fn open(&self, user: String, quota: u64) -> String;
    fn lookup(&self, key: String) -> (Option<String>, u64);
    fn touch(&mut self);
}

#[derive(Default)]
pub struct SessionStub {
    open_call: sync::RwLock<SessionStubOpenCall>,
    lookup_call: sync::RwLock<SessionStubLookupCall>,
    touch_call: sync::RwLock<SessionStubTouchCall>,
}

#[derive(Default)]
struct SessionStubOpenCall {
    stub: Option<Box<dyn Fn(String, u64) -> String + Send + Sync>>,
    args_for_call: Vec<(String, u64)>,
    returns: Option<String>,
}

#[derive(Default)]
struct SessionStubLookupCall {
    stub: Option<Box<dyn Fn(String) -> (Option<String>, u64) + Send + Sync>>,
    args_for_call: Vec<String>,
    returns: Option<(Option<String>, u64)>,
}

#[derive(Default)]
struct SessionStubTouchCall {
    stub: Option<Box<dyn Fn() + Send + Sync>>,
    args_for_call: Vec<()>,
}

impl Session for SessionStub {
    fn open(&self, arg1: String, arg2: u64) -> String {
        let mut call = self.open_call.write().unwrap();
        call.args_for_call.push((arg1.clone(), arg2.clone()));
        if let Some(stub) = call.stub.as_ref() {
            return stub(arg1, arg2);
        }
        call.returns.clone().unwrap_or_default()
    }
    fn lookup(&self, arg1: String) -> (Option<String>, u64) {
        let mut call = self.lookup_call.write().unwrap();
        call.args_for_call.push(arg1.clone());
        if let Some(stub) = call.stub.as_ref() {
            return stub(arg1);
        }
        call.returns.clone().unwrap_or_default()
    }
    fn touch(&mut self) {
        let mut call = self.touch_call.write().unwrap();
        call.args_for_call.push(());
        if let Some(stub) = call.stub.as_ref() {
            stub();
        }
    }
}

impl SessionStub {
    pub fn open_call_count(&self) -> usize {
        self.open_call.read().unwrap().args_for_call.len()
    }
    pub fn open_args_for_call(&self, index: usize) -> (String, u64) {
        self.open_call.read().unwrap().args_for_call[index].clone()
    }
    pub fn set_open_returns(&self, result1: String) {
        self.open_call.write().unwrap().returns = Some(result1);
    }
    pub fn set_open_stub(&self, stub: Box<dyn Fn(String, u64) -> String + Send + Sync>) {
        self.open_call.write().unwrap().stub = Some(stub);
    }
}

impl SessionStub {
    pub fn lookup_call_count(&self) -> usize {
        self.lookup_call.read().unwrap().args_for_call.len()
    }
    pub fn lookup_args_for_call(&self, index: usize) -> String {
        self.lookup_call.read().unwrap().args_for_call[index].clone()
    }
    pub fn set_lookup_returns(&self, result1: Option<String>, result2: u64) {
        self.lookup_call.write().unwrap().returns = Some((result1, result2));
    }
    pub fn set_lookup_stub(&self, stub: Box<dyn Fn(String) -> (Option<String>, u64) + Send + Sync>) {
        self.lookup_call.write().unwrap().stub = Some(stub);
    }
}

impl SessionStub {
    pub fn touch_call_count(&self) -> usize {
        self.touch_call.read().unwrap().args_for_call.len()
    }
    pub fn set_touch_stub(&self, stub: Box<dyn Fn() + Send + Sync>) {
        self.touch_call.write().unwrap().stub = Some(stub);
    }
}

#[test]
fn unconfigured_methods_return_defaults() {
    let stub = SessionStub::default();
    assert_eq!(stub.open("ana".into(), 5), "");
    assert_eq!(stub.lookup("k".into()), (None, 0));
}

#[test]
fn history_records_every_call_in_order() {
    let mut stub = SessionStub::default();
    assert_eq!(stub.open_call_count(), 0);
    stub.open("ana".into(), 1);
    stub.open("bob".into(), 2);
    stub.touch();
    assert_eq!(stub.open_call_count(), 2);
    assert_eq!(stub.touch_call_count(), 1);
    assert_eq!(stub.open_args_for_call(0), ("ana".to_string(), 1));
    assert_eq!(stub.open_args_for_call(1), ("bob".to_string(), 2));
}

#[test]
fn configured_returns_apply_to_future_calls_only() {
    let stub = SessionStub::default();
    assert_eq!(stub.lookup("a".into()), (None, 0));
    stub.set_lookup_returns(Some("hit".into()), 7);
    assert_eq!(stub.lookup("b".into()), (Some("hit".to_string()), 7));
    assert_eq!(stub.lookup("c".into()), (Some("hit".to_string()), 7));
    assert_eq!(stub.lookup_call_count(), 3);
}

#[test]
fn overrides_win_over_returns_and_still_record() {
    let stub = SessionStub::default();
    stub.set_open_returns("ignored".into());
    stub.set_open_stub(Box::new(|user, quota| format!("{user}:{quota}")));
    assert_eq!(stub.open("ana".into(), 9), "ana:9");
    assert_eq!(stub.open_call_count(), 1);
    assert_eq!(stub.open_args_for_call(0), ("ana".to_string(), 9));
}

#[test]
#[should_panic]
fn history_access_out_of_range_panics() {
    let stub = SessionStub::default();
    stub.open_args_for_call(0);
}

#[test]
fn concurrent_calls_are_recorded_exactly_once_each() {
    let stub = std::sync::Arc::new(SessionStub::default());
    let mut handles = Vec::new();
    for t in 0..8u64 {
        let stub = std::sync::Arc::clone(&stub);
        handles.push(std::thread::spawn(move || {
            for i in 0..100u64 {
                stub.open(format!("user{t}"), i);
            }
        }));
    }
    for handle in handles {
        handle.join().unwrap();
    }
    assert_eq!(stub.open_call_count(), 800);
}
