use profile_creator::platform::Platform;
use profile_creator::storage::codec;
use profile_creator::storage::{ChangeReason, FileBackend, KeyValueBackend, MemoryBackend, Profile};
use profile_creator::store::{DEFAULT_STORAGE_KEY, LoadSource, ProfileStore, StoreEvent, StoreState};
use tempfile::TempDir;

const KEY: &str = DEFAULT_STORAGE_KEY;

fn profiles(n: usize, platform: Platform) -> Vec<Profile> {
    (0..n)
        .map(|i| Profile::new(format!("Profile {}", i), "🙂", platform))
        .collect()
}

fn seeded(label: &str, snapshot: &[Profile]) -> MemoryBackend {
    let mut backend = MemoryBackend::new(label);
    backend.write(KEY, &codec::encode(snapshot).unwrap()).unwrap();
    backend
}

fn stored(backend: &impl KeyValueBackend) -> Option<Vec<Profile>> {
    backend
        .read(KEY)
        .unwrap()
        .and_then(|bytes| codec::decode(backend.label(), &bytes))
}

#[test]
fn remote_snapshot_wins_over_stale_local() {
    let remote_snapshot = profiles(3, Platform::Netflix);
    let local_snapshot = profiles(1, Platform::Netflix);
    let cloud = seeded("cloud", &remote_snapshot);
    let local = seeded("local", &local_snapshot);

    let store = ProfileStore::open(local, cloud, KEY);

    assert_eq!(store.state(), StoreState::Ready);
    assert_eq!(store.load_source(), LoadSource::Remote);
    assert_eq!(store.list(), remote_snapshot.as_slice());
    // Remote untouched, local not rewritten by loading
    assert_eq!(stored(store.remote()), Some(remote_snapshot));
    assert_eq!(stored(store.local()), Some(local_snapshot));
}

#[test]
fn local_snapshot_is_adopted_and_pushed_up() {
    let local_snapshot = profiles(2, Platform::Spotify);
    let cloud = MemoryBackend::new("cloud");
    let local = seeded("local", &local_snapshot);

    let store = ProfileStore::open(local, cloud, KEY);

    assert_eq!(store.load_source(), LoadSource::Local);
    assert_eq!(store.list(), local_snapshot.as_slice());
    assert_eq!(stored(store.remote()), Some(local_snapshot));
}

#[test]
fn corrupt_remote_falls_back_to_local() {
    let local_snapshot = profiles(2, Platform::Xbox);
    let mut cloud = MemoryBackend::new("cloud");
    cloud.write(KEY, b"{ definitely not a snapshot").unwrap();
    let local = seeded("local", &local_snapshot);

    let store = ProfileStore::open(local, cloud, KEY);

    assert_eq!(store.load_source(), LoadSource::Local);
    assert_eq!(store.list(), local_snapshot.as_slice());
    // Self-healing replaced the corrupt remote copy
    assert_eq!(stored(store.remote()), Some(local_snapshot));
}

#[test]
fn nothing_valid_anywhere_starts_empty() {
    let mut cloud = MemoryBackend::new("cloud");
    cloud.write(KEY, b"garbage").unwrap();
    let mut local = MemoryBackend::new("local");
    local.write(KEY, b"[{\"id\": 1}]").unwrap();

    let store = ProfileStore::open(local, cloud, KEY);

    assert_eq!(store.load_source(), LoadSource::Empty);
    assert!(store.is_empty());
}

#[test]
fn other_device_changes_replace_collection() {
    let cloud = MemoryBackend::new("cloud");
    let mut phone = ProfileStore::open(MemoryBackend::new("phone-local"), cloud.clone(), KEY);
    let mut tablet = ProfileStore::open(MemoryBackend::new("tablet-local"), cloud.clone(), KEY);
    let tablet_events = tablet.subscribe();

    let alex = Profile::new("Alex", "🐶", Platform::Netflix);
    phone.add(alex.clone());

    // Nothing is applied until the owner drains the queue
    assert!(tablet.is_empty());
    assert!(tablet.process_remote_changes());
    assert_eq!(tablet.list(), &[alex]);
    assert_eq!(
        tablet_events.try_recv().unwrap(),
        StoreEvent::Replaced {
            source: LoadSource::Remote,
            count: 1
        }
    );

    // Already caught up
    assert!(!tablet.process_remote_changes());
}

#[test]
fn queued_notifications_coalesce_into_one_reload() {
    let cloud = MemoryBackend::new("cloud");
    let mut phone = ProfileStore::open(MemoryBackend::new("phone-local"), cloud.clone(), KEY);
    let mut tablet = ProfileStore::open(MemoryBackend::new("tablet-local"), cloud.clone(), KEY);
    let tablet_events = tablet.subscribe();

    for p in profiles(3, Platform::Hulu) {
        phone.add(p);
    }

    assert!(tablet.process_remote_changes());
    assert_eq!(tablet.len(), 3);
    assert_eq!(tablet_events.try_iter().count(), 1);
}

#[test]
fn last_writer_wins_for_whole_collection() {
    let cloud = MemoryBackend::new("cloud");
    let mut phone = ProfileStore::open(MemoryBackend::new("phone-local"), cloud.clone(), KEY);
    let mut tablet = ProfileStore::open(MemoryBackend::new("tablet-local"), cloud.clone(), KEY);

    // Concurrent edits between sync points
    let from_phone = Profile::new("Phone", "📱", Platform::Netflix);
    let from_tablet = Profile::new("Tablet", "📲", Platform::Netflix);
    phone.add(from_phone.clone());
    tablet.add(from_tablet.clone());

    // Tablet wrote last; the phone adopts its snapshot and loses its own edit
    phone.process_remote_changes();
    assert_eq!(phone.list(), &[from_tablet.clone()]);

    // The tablet's queued notification reloads its own snapshot
    tablet.process_remote_changes();
    assert_eq!(tablet.list(), &[from_tablet]);
}

#[test]
fn account_change_triggers_reload() {
    let cloud = MemoryBackend::new("cloud");
    let mut store = ProfileStore::open(MemoryBackend::new("local"), cloud.clone(), KEY);
    let alex = Profile::new("Alex", "🐶", Platform::Netflix);
    store.add(alex.clone());
    let events = store.subscribe();

    cloud.broadcast(ChangeReason::AccountChange);

    assert!(store.process_remote_changes());
    assert_eq!(store.list(), &[alex]);
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::Replaced {
            source: LoadSource::Remote,
            count: 1
        }
    );
}

#[test]
fn remote_removal_reloads_from_local_and_pushes_back() {
    let cloud = MemoryBackend::new("cloud");
    let mut store = ProfileStore::open(MemoryBackend::new("local"), cloud.clone(), KEY);
    let snapshot = profiles(2, Platform::AppleMusic);
    for p in snapshot.clone() {
        store.add(p);
    }

    let mut peer = cloud.clone();
    peer.remove(KEY).unwrap();
    assert!(stored(&peer).is_none());

    assert!(store.process_remote_changes());
    assert_eq!(store.load_source(), LoadSource::Local);
    assert_eq!(store.list(), snapshot.as_slice());
    assert_eq!(stored(&peer), Some(snapshot));
}

#[test]
fn corrupt_remote_write_reloads_from_local_and_pushes_back() {
    let cloud = MemoryBackend::new("cloud");
    let mut store = ProfileStore::open(MemoryBackend::new("local"), cloud.clone(), KEY);
    let events = store.subscribe();
    let sam = Profile::new("Sam", "🦊", Platform::Roblox);
    store.add(sam.clone());
    events.try_iter().for_each(drop);

    let mut peer = cloud.clone();
    peer.write(KEY, b"\x00\x01 not json").unwrap();

    assert!(store.process_remote_changes());
    assert_eq!(store.load_source(), LoadSource::Local);
    assert_eq!(store.list(), &[sam.clone()]);
    assert_eq!(stored(&peer), Some(vec![sam]));
    assert_eq!(
        events.try_recv().unwrap(),
        StoreEvent::Replaced {
            source: LoadSource::Local,
            count: 1
        }
    );
}

#[test]
fn delete_all_propagates_to_other_device() {
    let cloud = MemoryBackend::new("cloud");
    let mut phone = ProfileStore::open(MemoryBackend::new("phone-local"), cloud.clone(), KEY);
    let mut tablet = ProfileStore::open(MemoryBackend::new("tablet-local"), cloud.clone(), KEY);

    phone.add(Profile::new("A", "🙂", Platform::Netflix));
    phone.add(Profile::new("B", "🙂", Platform::Steam));
    tablet.process_remote_changes();
    assert_eq!(tablet.len(), 2);

    phone.delete_all();
    tablet.process_remote_changes();
    assert!(tablet.is_empty());
    for platform in Platform::ALL {
        assert!(tablet.list_for_platform(platform).is_empty());
    }
}

#[test]
fn file_backends_survive_restart() {
    let dir = TempDir::new().unwrap();
    let local_dir = dir.path().join("local");
    let synced_dir = dir.path().join("synced");
    let alex = Profile::new("Alex", "🐶", Platform::Netflix).kids(true);

    {
        let local = FileBackend::open("local", &local_dir).unwrap();
        let synced = FileBackend::open("synced", &synced_dir).unwrap();
        let mut store = ProfileStore::open(local, synced, KEY);
        store.add(alex.clone());
    }

    let local = FileBackend::open("local", &local_dir).unwrap();
    let synced = FileBackend::open("synced", &synced_dir).unwrap();
    let store = ProfileStore::open(local, synced, KEY);

    assert_eq!(store.load_source(), LoadSource::Remote);
    assert_eq!(store.list(), &[alex]);
}

#[test]
fn offline_device_pushes_local_copy_when_synced_folder_is_empty() {
    let dir = TempDir::new().unwrap();
    let local_dir = dir.path().join("local");
    let synced_dir = dir.path().join("synced");
    let snapshot = profiles(2, Platform::Minecraft);

    let mut local = FileBackend::open("local", &local_dir).unwrap();
    local.write(KEY, &codec::encode(&snapshot).unwrap()).unwrap();
    let synced = FileBackend::open("synced", &synced_dir).unwrap();

    let store = ProfileStore::open(local, synced, KEY);

    assert_eq!(store.load_source(), LoadSource::Local);
    assert!(synced_dir.join(format!("{}.json", KEY)).exists());
    assert_eq!(stored(store.remote()), Some(snapshot));
}

#[test]
fn shared_folder_change_is_picked_up_on_synchronize() {
    let dir = TempDir::new().unwrap();
    let synced_dir = dir.path().join("synced");

    let mut laptop = ProfileStore::open(
        FileBackend::open("laptop-local", &dir.path().join("laptop")).unwrap(),
        FileBackend::open("synced", &synced_dir).unwrap(),
        KEY,
    );
    let mut desktop = ProfileStore::open(
        FileBackend::open("desktop-local", &dir.path().join("desktop")).unwrap(),
        FileBackend::open("synced", &synced_dir).unwrap(),
        KEY,
    );

    let sam = Profile::new("Sam", "🦊", Platform::Playstation);
    laptop.add(sam.clone());

    assert!(desktop.synchronize());
    assert_eq!(desktop.list(), &[sam]);
    assert!(!desktop.synchronize());
}
