use crate::common::{MAX_UPLOAD_SIZE, TestApp, routes};

#[tokio::test]
async fn leader_upload_is_stored_and_served() {
    let app = TestApp::spawn().await;
    let (_, leader) = app.create_user_with_role("leader1", "leader").await;
    let content = b"%PDF-1.4 chord chart".to_vec();

    let res = app
        .upload_with_token("file", "Amazing Grace.PDF", content.clone(), &leader)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let path = res.body["filePath"].as_str().unwrap().to_string();
    assert!(path.starts_with("/uploads/"), "{path}");
    assert!(path.ends_with(".pdf"), "{path}");

    let name = path.trim_start_matches("/uploads/");
    assert!(app.upload_dir.join(name).exists());

    let served = app.client.get(app.url(&path)).send().await.unwrap();
    assert_eq!(served.status().as_u16(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), content);
}

#[tokio::test]
async fn same_file_name_never_collides() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let first = app
        .upload_with_token("file", "chart.pdf", b"one".to_vec(), &admin)
        .await;
    let second = app
        .upload_with_token("file", "chart.pdf", b"two".to_vec(), &admin)
        .await;

    assert_eq!(first.status, 200);
    assert_eq!(second.status, 200);
    assert_ne!(first.body["filePath"], second.body["filePath"]);
}

#[tokio::test]
async fn member_cannot_upload() {
    let app = TestApp::spawn().await;
    let (_, member) = app.create_user_with_role("member1", "member").await;

    let res = app
        .upload_with_token("file", "chart.pdf", b"data".to_vec(), &member)
        .await;

    assert_eq!(res.status, 403);
    assert_eq!(res.body["code"], "PERMISSION_DENIED");
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;

    let res = app
        .upload_with_token("attachment", "chart.pdf", b"data".to_vec(), &admin)
        .await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn oversized_file_is_rejected() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let content = vec![b'x'; MAX_UPLOAD_SIZE as usize + 1];

    let res = app.upload_with_token("file", "big.bin", content, &admin).await;

    assert_eq!(res.status, 400);
    assert_eq!(res.body["code"], "VALIDATION_ERROR");
    assert_eq!(
        res.body["error"],
        format!("File exceeds maximum size of {MAX_UPLOAD_SIZE} bytes")
    );

    let stored_files = std::fs::read_dir(&app.upload_dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|entry| entry.path().is_file())
        .count();
    assert_eq!(stored_files, 0);
    let partial_files = std::fs::read_dir(app.upload_dir.join(".tmp")).unwrap().count();
    assert_eq!(partial_files, 0);
}

#[tokio::test]
async fn file_at_the_size_limit_is_stored_intact() {
    let app = TestApp::spawn().await;
    let admin = app.admin_token().await;
    let content: Vec<u8> = (0..MAX_UPLOAD_SIZE).map(|i| (i % 251) as u8).collect();

    let res = app
        .upload_with_token("file", "track.mp3", content.clone(), &admin)
        .await;

    assert_eq!(res.status, 200, "{}", res.text);
    let name = res.body["filePath"]
        .as_str()
        .unwrap()
        .trim_start_matches("/uploads/")
        .to_string();
    assert_eq!(std::fs::read(app.upload_dir.join(name)).unwrap(), content);
}

#[tokio::test]
async fn upload_requires_a_token() {
    let app = TestApp::spawn().await;

    let res = app
        .client
        .post(app.url(routes::UPLOAD))
        .multipart(reqwest::multipart::Form::new().text("file", "x"))
        .send()
        .await
        .unwrap();

    assert_eq!(res.status().as_u16(), 401);
}
