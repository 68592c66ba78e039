#[rocket::launch]
fn rocket() -> _ {
    let rocket = import_api::rocket();
    log::info!("Starting organization import API server");
    rocket
}
