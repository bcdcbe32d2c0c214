use std::cell::RefCell;
use std::rc::Rc;

use pkicodec_collection::{
    Error, FieldNotifier, Notification, ObservableCollection, ObserveFields,
};
use pkicodec_x509::Extensions;
use pkicodec_x509::extensions::{BasicConstraints, Extension, InhibitAnyPolicy};
use pkicodec_x509::{CertificateExtension, TypedExtension};

/// A template entry that reports edits of its fields.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Template {
    name: String,
    notifier: FieldNotifier,
}

impl Template {
    fn new(name: &str) -> Self {
        Template {
            name: name.to_string(),
            notifier: FieldNotifier::new(),
        }
    }

    fn set_name(&mut self, name: &str) {
        self.name = name.to_string();
        self.notifier.notify("name");
    }
}

impl ObserveFields for Template {
    fn field_notifier(&self) -> &FieldNotifier {
        &self.notifier
    }
}

fn child_changes(collection: &ObservableCollection<Template>) -> Rc<RefCell<Vec<&'static str>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    collection.subscribe(move |n| {
        if let Notification::ChildChanged { field } = n {
            sink.borrow_mut().push(*field);
        }
        Ok(())
    });
    seen
}

fn extension(ca: bool) -> CertificateExtension {
    TypedExtension::new(
        BasicConstraints {
            ca,
            path_len_constraint: None,
        },
        true,
    )
    .unwrap()
    .into()
}

#[test]
fn test_close_and_reopen() {
    let mut collection = ObservableCollection::new();
    collection.add(extension(true)).unwrap();
    collection.close();

    assert_eq!(Err(Error::CollectionClosed), collection.add(extension(false)));
    assert_eq!(1, collection.len());
    assert_eq!(Some(&extension(true)), collection.get(0));

    collection.clear();
    assert!(collection.is_empty());
    assert!(!collection.is_closed());
    collection.add(extension(false)).unwrap();
    assert_eq!(1, collection.len());
}

#[test]
fn test_field_change_of_inserted_element() {
    let mut collection = ObservableCollection::notifying();
    let seen = child_changes(&collection);

    collection.add(Template::new("User")).unwrap();
    collection.get_mut(0).unwrap().set_name("WebServer");
    assert_eq!(vec!["name"], *seen.borrow());

    let mut removed = collection.remove_at(0).unwrap();
    removed.set_name("Machine");
    assert_eq!(vec!["name"], *seen.borrow());
    assert_eq!(0, removed.field_notifier().listener_count());
}

#[test]
fn test_replaced_element_is_unsubscribed() {
    let mut collection = ObservableCollection::notifying();
    let seen = child_changes(&collection);

    collection.add(Template::new("User")).unwrap();
    let mut old = collection.set(0, Template::new("Machine")).unwrap();
    old.set_name("ignored");
    assert!(seen.borrow().is_empty());

    collection.get_mut(0).unwrap().set_name("Router");
    assert_eq!(vec!["name"], *seen.borrow());
}

fn kind(notification: &Notification<'_, CertificateExtension>) -> &'static str {
    match notification {
        Notification::Added { .. } => "Added",
        Notification::Removed { .. } => "Removed",
        Notification::Replaced { .. } => "Replaced",
        Notification::Reset => "Reset",
        Notification::CountChanged { .. } => "CountChanged",
        Notification::ChildChanged { .. } => "ChildChanged",
    }
}

#[test]
fn test_extensions_list_notifications() {
    let mut list = Extensions::new();
    let log = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&log);
    let id = list.subscribe(move |n| {
        sink.borrow_mut().push(kind(n));
        Ok(())
    });

    list.push(extension(true)).unwrap();
    list.push(TypedExtension::new(InhibitAnyPolicy { skip_certs: 0 }, true).unwrap())
        .unwrap();
    list.remove_by_oid(BasicConstraints::OID).unwrap();
    assert!(list.unsubscribe(id));
    list.clear();

    assert_eq!(
        vec!["Added", "CountChanged", "Added", "CountChanged", "Removed", "CountChanged"],
        *log.borrow()
    );
    assert!(list.is_empty());
}
